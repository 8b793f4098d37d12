//! Session repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use saveserve_core::error::{AppError, ErrorKind};
use saveserve_core::result::AppResult;
use saveserve_entity::session::Session;

/// Repository for login session rows.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new session row.
    pub async fn create(
        &self,
        user_id: Uuid,
        refresh_jti: Uuid,
        expires_at: DateTime<Utc>,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> AppResult<Session> {
        sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (user_id, refresh_jti, expires_at, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(user_id)
        .bind(refresh_jti)
        .bind(expires_at)
        .bind(ip_address)
        .bind(user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create session", e))
    }

    /// Find a session by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find session", e))
    }

    /// Rotate the refresh token JTI and extend the session expiry.
    pub async fn rotate_refresh(
        &self,
        id: Uuid,
        old_jti: Uuid,
        new_jti: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Session> {
        sqlx::query_as::<_, Session>(
            "UPDATE sessions SET refresh_jti = $3, expires_at = $4 \
             WHERE id = $1 AND refresh_jti = $2 AND NOT revoked RETURNING *",
        )
        .bind(id)
        .bind(old_jti)
        .bind(new_jti)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rotate session", e))?
        .ok_or_else(|| AppError::session("Refresh token is no longer valid"))
    }

    /// Revoke a session (logout).
    pub async fn revoke(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE sessions SET revoked = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to revoke session", e)
            })?;
        Ok(())
    }

    /// Delete expired and revoked sessions older than the cutoff.
    pub async fn delete_stale_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result =
            sqlx::query("DELETE FROM sessions WHERE (revoked OR expires_at < NOW()) AND created_at < $1")
                .bind(cutoff)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to delete stale sessions", e)
                })?;
        Ok(result.rows_affected())
    }
}
