//! User registration, profiles, and stats.

use std::sync::Arc;

use tracing::info;

use saveserve_auth::password::{PasswordHasher, PasswordValidator};
use saveserve_core::error::AppError;
use saveserve_database::repositories::stats::StatsRepository;
use saveserve_database::repositories::user::UserRepository;
use saveserve_entity::stats::UserStats;
use saveserve_entity::user::{CreateUser, RecipientSubrole, UpdateProfile, User, UserRole};

use crate::context::RequestContext;

/// Registration input, pre-validation.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plaintext password, validated then hashed here.
    pub password: String,
    /// Display name.
    pub display_name: Option<String>,
    /// Account role; `admin` is not self-assignable.
    pub role: UserRole,
    /// Recipient subrole, required for recipients.
    pub subrole: Option<RecipientSubrole>,
    /// Organization name.
    pub organization: Option<String>,
}

/// Manages user accounts: registration, profile reads/edits, and stats.
#[derive(Debug, Clone)]
pub struct UserService {
    user_repo: Arc<UserRepository>,
    stats_repo: Arc<StatsRepository>,
    password_hasher: Arc<PasswordHasher>,
    password_validator: Arc<PasswordValidator>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        stats_repo: Arc<StatsRepository>,
        password_hasher: Arc<PasswordHasher>,
        password_validator: Arc<PasswordValidator>,
    ) -> Self {
        Self {
            user_repo,
            stats_repo,
            password_hasher,
            password_validator,
        }
    }

    /// Register a new provider or recipient account.
    pub async fn register(&self, registration: Registration) -> Result<User, AppError> {
        if registration.role == UserRole::Admin {
            return Err(AppError::authorization(
                "Admin accounts cannot be self-registered",
            ));
        }
        if registration.role == UserRole::Recipient && registration.subrole.is_none() {
            return Err(AppError::validation(
                "Recipients must declare a subrole (student, staff, or ngo)",
            ));
        }
        if registration.username.len() < 3 {
            return Err(AppError::validation(
                "Username must be at least 3 characters",
            ));
        }
        if !registration.email.contains('@') {
            return Err(AppError::validation("Email address is not valid"));
        }

        self.password_validator.validate(
            &registration.password,
            &[&registration.username, &registration.email],
        )?;

        let password_hash = self.password_hasher.hash_password(&registration.password)?;

        let user = self
            .user_repo
            .create(&CreateUser {
                username: registration.username,
                email: registration.email,
                password_hash,
                display_name: registration.display_name,
                role: registration.role,
                subrole: if registration.role == UserRole::Recipient {
                    registration.subrole
                } else {
                    None
                },
                organization: registration.organization,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// The current user's full profile.
    pub async fn get_profile(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Update the current user's profile.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        update: UpdateProfile,
    ) -> Result<User, AppError> {
        if let Some(email) = &update.email {
            if !email.contains('@') {
                return Err(AppError::validation("Email address is not valid"));
            }
        }
        self.user_repo.update_profile(ctx.user_id, &update).await
    }

    /// The current user's cumulative activity counters.
    pub async fn get_stats(&self, ctx: &RequestContext) -> Result<UserStats, AppError> {
        self.stats_repo.find_by_user(ctx.user_id).await
    }
}
