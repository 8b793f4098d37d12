//! Request context carrying the authenticated user and session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use saveserve_entity::user::{RecipientSubrole, UserRole};

/// Context for the current authenticated request.
///
/// Extracted by the API layer and passed into service methods so that
/// every operation knows *who* is acting and from *which* session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The current session ID.
    pub session_id: Uuid,
    /// The user's role at the time the JWT was issued.
    pub role: UserRole,
    /// The user's recipient subrole, if any.
    pub subrole: Option<RecipientSubrole>,
    /// The username (convenience field from JWT claims).
    pub username: String,
    /// IP address of the request origin.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        user_id: Uuid,
        session_id: Uuid,
        role: UserRole,
        subrole: Option<RecipientSubrole>,
        username: String,
        ip_address: String,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            user_id,
            session_id,
            role,
            subrole,
            username,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Returns whether the current user is a provider.
    pub fn is_provider(&self) -> bool {
        matches!(self.role, UserRole::Provider)
    }

    /// Returns whether the current user is a recipient.
    pub fn is_recipient(&self) -> bool {
        matches!(self.role, UserRole::Recipient)
    }

    /// Returns whether the current user is an NGO-subrole recipient.
    pub fn is_ngo(&self) -> bool {
        self.is_recipient() && self.subrole == Some(RecipientSubrole::Ngo)
    }
}
