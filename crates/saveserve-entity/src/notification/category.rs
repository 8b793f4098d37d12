//! Notification category enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad grouping of notifications, used for inbox filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    /// Booking lifecycle events (requested, approved, rejected, cancelled).
    Booking,
    /// Listing events (posted, expiring).
    Listing,
    /// Pickup verification events.
    Collection,
    /// Platform announcements.
    System,
}

impl NotificationCategory {
    /// Return the category as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booking => "booking",
            Self::Listing => "listing",
            Self::Collection => "collection",
            Self::System => "system",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
