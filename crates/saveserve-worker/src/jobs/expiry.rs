//! Expiry sweeps: overdue booking QRs, stale listings, elapsed NGO windows.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use saveserve_database::repositories::booking::BookingRepository;
use saveserve_database::repositories::listing::ListingRepository;
use saveserve_entity::notification::NewNotification;
use saveserve_service::notification::NotificationService;

use crate::executor::{JobExecutionError, JobHandler};

/// Expires approved bookings whose QR deadline passed and releases their
/// listing holds. Affected recipients are notified best-effort.
#[derive(Debug)]
pub struct BookingExpiryHandler {
    booking_repo: Arc<BookingRepository>,
    notifications: Arc<NotificationService>,
}

impl BookingExpiryHandler {
    /// Create a new booking expiry handler.
    pub fn new(
        booking_repo: Arc<BookingRepository>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            booking_repo,
            notifications,
        }
    }
}

#[async_trait]
impl JobHandler for BookingExpiryHandler {
    fn job_type(&self) -> &str {
        "booking_expiry"
    }

    async fn execute(&self) -> Result<Option<Value>, JobExecutionError> {
        let expired = self.booking_repo.expire_overdue(Utc::now()).await?;

        for booking in &expired {
            self.notifications.dispatch_best_effort(NewNotification::booking(
                booking.recipient_id,
                "booking.expired",
                "Booking expired",
                &format!(
                    "Your booking for {} was not collected in time",
                    booking.listing_title
                ),
                booking.provider_id,
                booking.id,
            ));
        }

        Ok(Some(serde_json::json!({ "expired": expired.len() })))
    }
}

/// Expires listings whose freshness window has elapsed.
#[derive(Debug)]
pub struct ListingExpiryHandler {
    listing_repo: Arc<ListingRepository>,
}

impl ListingExpiryHandler {
    /// Create a new listing expiry handler.
    pub fn new(listing_repo: Arc<ListingRepository>) -> Self {
        Self { listing_repo }
    }
}

#[async_trait]
impl JobHandler for ListingExpiryHandler {
    fn job_type(&self) -> &str {
        "listing_expiry"
    }

    async fn execute(&self) -> Result<Option<Value>, JobExecutionError> {
        let expired = self.listing_repo.expire_overdue(Utc::now()).await?;
        Ok(Some(serde_json::json!({ "expired": expired })))
    }
}

/// Clears NGO-exclusivity flags whose window has elapsed, opening the
/// listings to all recipients.
#[derive(Debug)]
pub struct NgoWindowReleaseHandler {
    listing_repo: Arc<ListingRepository>,
}

impl NgoWindowReleaseHandler {
    /// Create a new NGO window release handler.
    pub fn new(listing_repo: Arc<ListingRepository>) -> Self {
        Self { listing_repo }
    }
}

#[async_trait]
impl JobHandler for NgoWindowReleaseHandler {
    fn job_type(&self) -> &str {
        "ngo_window_release"
    }

    async fn execute(&self) -> Result<Option<Value>, JobExecutionError> {
        let released = self.listing_repo.release_ngo_windows(Utc::now()).await?;
        Ok(Some(serde_json::json!({ "released": released })))
    }
}
