//! User role and recipient subrole enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Platform administrator.
    Admin,
    /// Posts surplus food listings (canteen, hostel, event organizer).
    Provider,
    /// Books and collects food (student, staff, NGO).
    Recipient,
}

impl UserRole {
    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Provider => "provider",
            Self::Recipient => "recipient",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = saveserve_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "provider" => Ok(Self::Provider),
            "recipient" => Ok(Self::Recipient),
            _ => Err(saveserve_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, provider, recipient"
            ))),
        }
    }
}

/// Finer-grained recipient classification. Only `Ngo` recipients may book
/// listings during an NGO-exclusive window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "recipient_subrole", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecipientSubrole {
    /// Student recipient.
    Student,
    /// Staff recipient.
    Staff,
    /// Registered NGO.
    Ngo,
}

impl RecipientSubrole {
    /// Return the subrole as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Staff => "staff",
            Self::Ngo => "ngo",
        }
    }
}

impl fmt::Display for RecipientSubrole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecipientSubrole {
    type Err = saveserve_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "staff" => Ok(Self::Staff),
            "ngo" => Ok(Self::Ngo),
            _ => Err(saveserve_core::AppError::validation(format!(
                "Invalid recipient subrole: '{s}'. Expected one of: student, staff, ngo"
            ))),
        }
    }
}
