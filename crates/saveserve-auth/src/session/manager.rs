//! Session lifecycle manager — login, logout, refresh token flows.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use saveserve_core::config::session::SessionConfig;
use saveserve_core::error::AppError;
use saveserve_database::repositories::session::SessionRepository;
use saveserve_database::repositories::user::UserRepository;
use saveserve_entity::session::Session;
use saveserve_entity::user::User;

use crate::jwt::decoder::JwtDecoder;
use crate::jwt::encoder::{JwtEncoder, TokenPair};
use crate::password::hasher::PasswordHasher;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// Generated token pair.
    pub tokens: TokenPair,
    /// Created session.
    pub session: Session,
    /// The authenticated user.
    pub user: User,
}

/// Manages the complete session lifecycle.
#[derive(Debug, Clone)]
pub struct SessionManager {
    /// JWT encoder for token generation.
    jwt_encoder: Arc<JwtEncoder>,
    /// JWT decoder for refresh validation.
    jwt_decoder: Arc<JwtDecoder>,
    /// Session persistence.
    session_repo: Arc<SessionRepository>,
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Password hasher.
    password_hasher: Arc<PasswordHasher>,
    /// Session configuration.
    session_config: SessionConfig,
}

impl SessionManager {
    /// Creates a new session manager with all required dependencies.
    pub fn new(
        jwt_encoder: Arc<JwtEncoder>,
        jwt_decoder: Arc<JwtDecoder>,
        session_repo: Arc<SessionRepository>,
        user_repo: Arc<UserRepository>,
        password_hasher: Arc<PasswordHasher>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            jwt_encoder,
            jwt_decoder,
            session_repo,
            user_repo,
            password_hasher,
            session_config,
        }
    }

    /// Performs the complete login flow: validate credentials, check the
    /// account status, create a session row, and mint a token pair.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<LoginResult, AppError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid username or password"))?;

        if !self
            .password_hasher
            .verify_password(password, &user.password_hash)?
        {
            warn!(username, "Failed login attempt");
            return Err(AppError::authentication("Invalid username or password"));
        }

        if !user.can_login() {
            return Err(AppError::authorization("Account is suspended"));
        }

        let expires_at = Utc::now() + Duration::hours(self.session_config.ttl_hours as i64);
        // The refresh JTI is minted with the tokens; create the session row
        // first with a placeholder, then rotate it in.
        let session = self
            .session_repo
            .create(user.id, Uuid::new_v4(), expires_at, ip_address, user_agent)
            .await?;

        let tokens = self.jwt_encoder.generate_token_pair(&user, session.id)?;
        let session = self
            .session_repo
            .rotate_refresh(session.id, session.refresh_jti, tokens.refresh_jti, expires_at)
            .await?;

        self.user_repo.touch_last_login(user.id).await?;
        info!(user_id = %user.id, session_id = %session.id, "User logged in");

        Ok(LoginResult {
            tokens,
            session,
            user,
        })
    }

    /// Exchanges a refresh token for a fresh token pair, rotating the
    /// stored refresh JTI so the old refresh token is single-use.
    pub async fn refresh(&self, refresh_token: &str) -> Result<LoginResult, AppError> {
        let claims = self.jwt_decoder.decode_refresh_token(refresh_token)?;

        let session = self
            .session_repo
            .find_by_id(claims.session_id())
            .await?
            .ok_or_else(|| AppError::session("Session not found"))?;

        if !session.is_live() {
            return Err(AppError::session("Session has expired or been revoked"));
        }
        if session.refresh_jti != claims.jti {
            // A replayed refresh token; revoke the session outright.
            warn!(session_id = %session.id, "Refresh token replay detected");
            self.session_repo.revoke(session.id).await?;
            return Err(AppError::session("Refresh token is no longer valid"));
        }

        let user = self
            .user_repo
            .find_by_id(session.user_id)
            .await?
            .ok_or_else(|| AppError::session("User no longer exists"))?;
        if !user.can_login() {
            return Err(AppError::authorization("Account is suspended"));
        }

        let tokens = self.jwt_encoder.generate_token_pair(&user, session.id)?;
        let expires_at = Utc::now() + Duration::hours(self.session_config.ttl_hours as i64);
        let session = self
            .session_repo
            .rotate_refresh(session.id, claims.jti, tokens.refresh_jti, expires_at)
            .await?;

        Ok(LoginResult {
            tokens,
            session,
            user,
        })
    }

    /// Revokes a session (logout).
    pub async fn logout(&self, session_id: Uuid) -> Result<(), AppError> {
        self.session_repo.revoke(session_id).await?;
        info!(%session_id, "Session revoked");
        Ok(())
    }

    /// Confirms a session is still live; used by the request extractor on
    /// every authenticated call.
    pub async fn validate_session(&self, session_id: Uuid) -> Result<Session, AppError> {
        let session = self
            .session_repo
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::session("Session not found"))?;

        if !session.is_live() {
            return Err(AppError::session("Session has expired or been revoked"));
        }

        Ok(session)
    }
}
