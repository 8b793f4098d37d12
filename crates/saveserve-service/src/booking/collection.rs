//! Collection verification — the pickup-time finalization step.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use saveserve_core::error::AppError;
use saveserve_database::repositories::booking::{
    BookingRepository, CollectionOutcome, CollectionResolution,
};
use saveserve_entity::notification::NewNotification;

use crate::context::RequestContext;
use crate::notification::NotificationService;

use super::qr::QrService;

/// Verifies pickups: resolves the booking from a QR payload or backup
/// code, runs the transactional state transition, and dispatches the
/// post-commit notifications.
///
/// Notification delivery is at-most-once by design: the transaction has
/// already committed, and a failed push is logged and dropped, never
/// retried and never reported to the verifier.
#[derive(Debug, Clone)]
pub struct CollectionService {
    booking_repo: Arc<BookingRepository>,
    qr: Arc<QrService>,
    notifications: Arc<NotificationService>,
}

impl CollectionService {
    /// Creates a new collection service.
    pub fn new(
        booking_repo: Arc<BookingRepository>,
        qr: Arc<QrService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            booking_repo,
            qr,
            notifications,
        }
    }

    /// Verify a pickup against `listing_id` using either a scanned QR
    /// payload or the 6-digit backup code.
    pub async fn verify(
        &self,
        ctx: &RequestContext,
        listing_id: Uuid,
        qr_data: Option<&str>,
        collection_code: Option<&str>,
    ) -> Result<CollectionOutcome, AppError> {
        if !ctx.is_provider() {
            return Err(AppError::authorization(
                "Only providers can verify collection",
            ));
        }

        let resolution = match (qr_data, collection_code) {
            (Some(qr), _) => {
                let payload = self.qr.verify_payload(qr)?;
                if payload.listing_id != listing_id {
                    return Err(AppError::validation(
                        "QR payload does not belong to this listing",
                    ));
                }
                CollectionResolution::ByBookingId(payload.booking_id)
            }
            (None, Some(code)) => {
                if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
                    return Err(AppError::validation(
                        "Collection code must be exactly 6 digits",
                    ));
                }
                CollectionResolution::ByCode(code.to_string())
            }
            (None, None) => {
                return Err(AppError::validation(
                    "Either qr_data or collection_code is required",
                ));
            }
        };

        let outcome = self
            .booking_repo
            .verify_collection(listing_id, ctx.user_id, resolution, Utc::now())
            .await?;

        info!(
            booking_id = %outcome.booking.id,
            listing_id = %outcome.listing.id,
            verifier = %ctx.user_id,
            "Collection verified"
        );

        self.notifications.dispatch_best_effort(NewNotification::collection(
            outcome.booking.recipient_id,
            "collection.confirmed",
            "Pickup confirmed",
            &format!(
                "Your pickup of {} x {} was confirmed",
                outcome.booking.approved_quantity, outcome.booking.listing_title
            ),
            ctx.user_id,
            outcome.booking.id,
        ));
        self.notifications.dispatch_best_effort(NewNotification::collection(
            outcome.booking.provider_id,
            "collection.completed",
            "Donation collected",
            &format!(
                "{} collected {} x {}",
                outcome.booking.recipient_name,
                outcome.booking.approved_quantity,
                outcome.booking.listing_title
            ),
            ctx.user_id,
            outcome.booking.id,
        ));

        Ok(outcome)
    }
}
