//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::category::NotificationCategory;

/// A notification delivered to a user. Append-only; the only mutable state
/// is the read/dismissed pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The recipient user.
    pub user_id: Uuid,
    /// Notification category.
    pub category: NotificationCategory,
    /// Event type that triggered this notification.
    pub event_type: String,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Additional structured data (JSON).
    pub payload: Option<serde_json::Value>,
    /// Whether the user has read this notification.
    pub is_read: bool,
    /// When the notification was read.
    pub read_at: Option<DateTime<Utc>>,
    /// Whether the user dismissed this notification.
    pub is_dismissed: bool,
    /// The user who triggered the action (if applicable).
    pub actor_id: Option<Uuid>,
    /// Resource type involved (if applicable).
    pub resource_type: Option<String>,
    /// Resource ID involved (if applicable).
    pub resource_id: Option<Uuid>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

/// Data for a notification about to be written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    /// The recipient user.
    pub user_id: Uuid,
    /// Notification category.
    pub category: NotificationCategory,
    /// Event type that triggered this notification.
    pub event_type: String,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Additional structured data (JSON).
    pub payload: Option<serde_json::Value>,
    /// The user who triggered the action.
    pub actor_id: Option<Uuid>,
    /// Resource type involved.
    pub resource_type: Option<String>,
    /// Resource ID involved.
    pub resource_id: Option<Uuid>,
}

impl NewNotification {
    /// Shorthand for a booking-scoped notification.
    pub fn booking(
        user_id: Uuid,
        event_type: &str,
        title: &str,
        message: &str,
        actor_id: Uuid,
        booking_id: Uuid,
    ) -> Self {
        Self {
            user_id,
            category: NotificationCategory::Booking,
            event_type: event_type.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            payload: None,
            actor_id: Some(actor_id),
            resource_type: Some("booking".to_string()),
            resource_id: Some(booking_id),
        }
    }

    /// Shorthand for a collection-scoped notification.
    pub fn collection(
        user_id: Uuid,
        event_type: &str,
        title: &str,
        message: &str,
        actor_id: Uuid,
        booking_id: Uuid,
    ) -> Self {
        Self {
            user_id,
            category: NotificationCategory::Collection,
            event_type: event_type.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            payload: None,
            actor_id: Some(actor_id),
            resource_type: Some("booking".to_string()),
            resource_id: Some(booking_id),
        }
    }
}
