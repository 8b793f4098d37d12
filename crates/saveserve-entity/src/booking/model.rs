//! Booking entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::BookingStatus;

/// One recipient's claim against one food listing, tracked through the
/// booking status lifecycle.
///
/// Counterparty display names and the listing title are denormalized at
/// creation time so booking lists render without joins; the listing row
/// itself carries no booking state (bookings are the single source of
/// truth).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: Uuid,
    /// The listing being claimed.
    pub listing_id: Uuid,
    /// The listing's provider.
    pub provider_id: Uuid,
    /// The requesting recipient.
    pub recipient_id: Uuid,
    /// Listing title at request time.
    pub listing_title: String,
    /// Provider display name at request time.
    pub provider_name: String,
    /// Recipient display name at request time.
    pub recipient_name: String,
    /// Quantity requested (>= 1).
    pub requested_quantity: i32,
    /// Quantity approved; 0 until approval, then equals the request.
    pub approved_quantity: i32,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Free-text provider response attached at approval/rejection.
    pub provider_response: Option<String>,
    /// Signed QR payload issued at approval. Unique across bookings.
    pub qr_payload: Option<String>,
    /// When the QR payload stops being accepted.
    pub qr_expires_at: Option<DateTime<Utc>>,
    /// 6-digit backup code for pickup without a scanner.
    pub collection_code: Option<String>,
    /// The provider account that verified the pickup.
    pub collected_by: Option<Uuid>,
    /// When the booking was requested.
    pub requested_at: DateTime<Utc>,
    /// When the booking was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// When the booking was rejected.
    pub rejected_at: Option<DateTime<Utc>>,
    /// When the booking was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// When the pickup was verified.
    pub collected_at: Option<DateTime<Utc>>,
    /// Post-collection rating (1-5).
    pub rating: Option<i16>,
    /// Post-collection free-text feedback.
    pub feedback: Option<String>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Row update time.
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Whether the approval QR has expired at `now`.
    ///
    /// Unapproved bookings have no QR and never report expired.
    pub fn is_qr_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.qr_expires_at.map(|exp| now >= exp).unwrap_or(false)
    }

    /// Whether `user_id` is a party to this booking.
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.recipient_id == user_id || self.provider_id == user_id
    }

    /// Whether the recipient may still rate this booking.
    pub fn can_rate(&self) -> bool {
        self.status == BookingStatus::Collected && self.rating.is_none()
    }
}
