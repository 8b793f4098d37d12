//! User repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use saveserve_core::error::{AppError, ErrorKind};
use saveserve_core::result::AppResult;
use saveserve_entity::user::{CreateUser, UpdateProfile, User};

/// Repository for user CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user. Fails with a conflict if the username or email is
    /// taken.
    pub async fn create(&self, user: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash, display_name, role, subrole, organization) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.role)
        .bind(user.subrole)
        .bind(&user.organization)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::conflict("Username or email is already registered")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    /// Update profile fields, leaving unset fields untouched.
    pub async fn update_profile(&self, id: Uuid, update: &UpdateProfile) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET \
                email = COALESCE($2, email), \
                display_name = COALESCE($3, display_name), \
                organization = COALESCE($4, organization), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&update.email)
        .bind(&update.display_name)
        .bind(&update.organization)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::RowNotFound => AppError::not_found("User not found"),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::conflict("Email is already registered")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to update profile", e),
        })
    }

    /// Stamp the last successful login time.
    pub async fn touch_last_login(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to stamp last login", e)
            })?;
        Ok(())
    }

    /// All active NGO-subrole recipients, for the bulk-listing email fan-out.
    pub async fn find_ngo_recipients(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users \
             WHERE role = 'recipient' AND subrole = 'ngo' AND status = 'active'",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list NGO recipients", e)
        })
    }
}
