//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::{RecipientSubrole, UserRole};
use super::status::UserStatus;

/// A registered user in the SaveServe system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// Account role.
    pub role: UserRole,
    /// Recipient subrole (recipients only).
    pub subrole: Option<RecipientSubrole>,
    /// Organization name (canteen, hostel, NGO, ...).
    pub organization: Option<String>,
    /// Account status.
    pub status: UserStatus,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Check if the user can log in right now.
    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }

    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// The name shown to counterparties: display name if set, else username.
    pub fn public_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    /// Whether this user is an NGO-subrole recipient.
    pub fn is_ngo(&self) -> bool {
        self.role == UserRole::Recipient && self.subrole == Some(RecipientSubrole::Ngo)
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Display name (optional).
    pub display_name: Option<String>,
    /// Assigned role.
    pub role: UserRole,
    /// Recipient subrole (recipients only).
    pub subrole: Option<RecipientSubrole>,
    /// Organization name (optional).
    pub organization: Option<String>,
}

/// Data for updating an existing user's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfile {
    /// New email address.
    pub email: Option<String>,
    /// New display name.
    pub display_name: Option<String>,
    /// New organization name.
    pub organization: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: UserRole, subrole: Option<RecipientSubrole>) -> User {
        User {
            id: Uuid::new_v4(),
            username: "canteen-a".to_string(),
            email: "canteen-a@example.org".to_string(),
            password_hash: "x".to_string(),
            display_name: None,
            role,
            subrole,
            organization: None,
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_public_name_falls_back_to_username() {
        let mut user = sample_user(UserRole::Provider, None);
        assert_eq!(user.public_name(), "canteen-a");
        user.display_name = Some("Canteen A".to_string());
        assert_eq!(user.public_name(), "Canteen A");
    }

    #[test]
    fn test_is_ngo_requires_recipient_role() {
        let ngo = sample_user(UserRole::Recipient, Some(RecipientSubrole::Ngo));
        assert!(ngo.is_ngo());
        let student = sample_user(UserRole::Recipient, Some(RecipientSubrole::Student));
        assert!(!student.is_ngo());
        let provider = sample_user(UserRole::Provider, Some(RecipientSubrole::Ngo));
        assert!(!provider.is_ngo());
    }
}
