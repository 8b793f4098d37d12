//! Login session entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A login session. One row per login; refreshed in place, revoked on
/// logout.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier (carried in JWT claims as `sid`).
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// JWT ID of the currently valid refresh token. Rotated on refresh.
    pub refresh_jti: Uuid,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
    /// Whether the session has been revoked (logout).
    pub revoked: bool,
    /// IP address at login.
    pub ip_address: Option<String>,
    /// User-Agent at login.
    pub user_agent: Option<String>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is still usable.
    pub fn is_live(&self) -> bool {
        !self.revoked && self.expires_at > Utc::now()
    }
}
