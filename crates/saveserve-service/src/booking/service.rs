//! Booking lifecycle orchestration.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use saveserve_core::config::booking::BookingConfig;
use saveserve_core::error::AppError;
use saveserve_core::types::pagination::{PageRequest, PageResponse};
use saveserve_database::repositories::booking::{ApprovalCredentials, BookingRepository};
use saveserve_database::repositories::listing::ListingRepository;
use saveserve_database::repositories::user::UserRepository;
use saveserve_entity::booking::{Booking, BookingStatus};
use saveserve_entity::notification::NewNotification;

use crate::context::RequestContext;
use crate::notification::NotificationService;

use super::qr::QrService;

/// A booking together with per-request derived flags.
///
/// The flags are computed on read and never persisted; the booking row is
/// the single source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingView {
    /// The underlying booking.
    #[serde(flatten)]
    pub booking: Booking,
    /// The provider can still approve this booking.
    pub can_approve: bool,
    /// Cancellation is still permitted.
    pub can_cancel: bool,
    /// The booking is ready for pickup verification.
    pub can_verify: bool,
    /// The approval QR has lapsed (or the booking already expired).
    pub is_expired: bool,
}

impl BookingView {
    /// Derive the flags for `booking` as of `now`.
    pub fn derive(booking: Booking, now: DateTime<Utc>) -> Self {
        let qr_lapsed = booking.is_qr_expired_at(now);
        Self {
            can_approve: booking.status == BookingStatus::Pending,
            can_cancel: booking.status.can_cancel(),
            can_verify: booking.status == BookingStatus::Approved && !qr_lapsed,
            is_expired: booking.status == BookingStatus::Expired || qr_lapsed,
            booking,
        }
    }
}

/// Orchestrates the booking lifecycle: request, approve/reject, cancel,
/// rate, and the listing-side booking views.
#[derive(Debug, Clone)]
pub struct BookingService {
    booking_repo: Arc<BookingRepository>,
    listing_repo: Arc<ListingRepository>,
    user_repo: Arc<UserRepository>,
    qr: Arc<QrService>,
    notifications: Arc<NotificationService>,
    config: BookingConfig,
}

impl BookingService {
    /// Creates a new booking service.
    pub fn new(
        booking_repo: Arc<BookingRepository>,
        listing_repo: Arc<ListingRepository>,
        user_repo: Arc<UserRepository>,
        qr: Arc<QrService>,
        notifications: Arc<NotificationService>,
        config: BookingConfig,
    ) -> Self {
        Self {
            booking_repo,
            listing_repo,
            user_repo,
            qr,
            notifications,
            config,
        }
    }

    /// Request a booking against a listing.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        listing_id: Uuid,
        quantity: i32,
    ) -> Result<Booking, AppError> {
        if !ctx.is_recipient() {
            return Err(AppError::authorization("Only recipients can book listings"));
        }
        if quantity < 1 {
            return Err(AppError::validation("Requested quantity must be at least 1"));
        }

        let recipient = self
            .user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::authentication("Account no longer exists"))?;

        let booking = self
            .booking_repo
            .create(
                listing_id,
                ctx.user_id,
                recipient.public_name(),
                ctx.is_ngo(),
                quantity,
                Utc::now(),
            )
            .await?;

        info!(booking_id = %booking.id, %listing_id, "Booking requested");

        self.notifications.dispatch_best_effort(NewNotification::booking(
            booking.provider_id,
            "booking.requested",
            "New booking request",
            &format!(
                "{} requested {} x {}",
                booking.recipient_name, booking.requested_quantity, booking.listing_title
            ),
            ctx.user_id,
            booking.id,
        ));

        Ok(booking)
    }

    /// Provider decision on a pending booking: `approved` or `rejected`.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        booking_id: Uuid,
        status: BookingStatus,
        provider_response: Option<String>,
    ) -> Result<Booking, AppError> {
        let booking = self.load_booking(booking_id).await?;
        if booking.provider_id != ctx.user_id {
            return Err(AppError::authorization(
                "Only the listing's provider can decide this booking",
            ));
        }
        if !booking.status.can_transition_to(status) {
            return Err(AppError::validation(format!(
                "Cannot move a booking from '{}' to '{}'",
                booking.status, status
            )));
        }

        let updated = match status {
            BookingStatus::Approved => self.approve(&booking, provider_response).await?,
            BookingStatus::Rejected => {
                self.booking_repo
                    .reject(booking_id, provider_response.as_deref(), Utc::now())
                    .await?
            }
            _ => {
                return Err(AppError::validation(
                    "Status must be 'approved' or 'rejected'",
                ));
            }
        };

        let (event, title) = match updated.status {
            BookingStatus::Approved => ("booking.approved", "Booking approved"),
            _ => ("booking.rejected", "Booking rejected"),
        };
        self.notifications.dispatch_best_effort(NewNotification::booking(
            updated.recipient_id,
            event,
            title,
            &format!("{} — {}", updated.listing_title, updated.status),
            ctx.user_id,
            updated.id,
        ));

        Ok(updated)
    }

    async fn approve(
        &self,
        booking: &Booking,
        provider_response: Option<String>,
    ) -> Result<Booking, AppError> {
        let listing = self
            .listing_repo
            .find_by_id(booking.listing_id)
            .await?
            .ok_or_else(|| AppError::not_found("Listing not found"))?;

        let now = Utc::now();
        let qr_payload = self.qr.generate_payload(
            booking.id,
            booking.recipient_id,
            booking.listing_id,
            now.timestamp(),
        )?;

        // A QR outliving the food's freshness window is useless; clamp.
        let qr_expires_at =
            (now + Duration::hours(self.config.qr_ttl_hours as i64)).min(listing.available_until);

        let credentials = ApprovalCredentials {
            qr_payload,
            qr_expires_at,
            collection_code: self.qr.generate_collection_code(),
        };

        let approved = self
            .booking_repo
            .approve(booking.id, provider_response.as_deref(), &credentials, now)
            .await?;
        info!(booking_id = %approved.id, "Booking approved");
        Ok(approved)
    }

    /// Cancel a booking. Either party may cancel while the booking is
    /// pending or approved.
    pub async fn cancel(&self, ctx: &RequestContext, booking_id: Uuid) -> Result<Booking, AppError> {
        let booking = self.load_booking(booking_id).await?;
        if !booking.involves(ctx.user_id) {
            return Err(AppError::authorization(
                "Only the booking's recipient or provider can cancel it",
            ));
        }

        let cancelled = self.booking_repo.cancel(booking_id, Utc::now()).await?;
        info!(booking_id = %cancelled.id, by = %ctx.user_id, "Booking cancelled");

        // Notify whichever party did not act.
        let counterparty = if ctx.user_id == cancelled.recipient_id {
            cancelled.provider_id
        } else {
            cancelled.recipient_id
        };
        self.notifications.dispatch_best_effort(NewNotification::booking(
            counterparty,
            "booking.cancelled",
            "Booking cancelled",
            &format!("{} — booking was cancelled", cancelled.listing_title),
            ctx.user_id,
            cancelled.id,
        ));

        Ok(cancelled)
    }

    /// Attach a rating to a collected booking. Recipient-only, one-shot.
    pub async fn rate(
        &self,
        ctx: &RequestContext,
        booking_id: Uuid,
        rating: i16,
        feedback: Option<String>,
    ) -> Result<Booking, AppError> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::validation("Rating must be between 1 and 5"));
        }

        let booking = self.load_booking(booking_id).await?;
        if booking.recipient_id != ctx.user_id {
            return Err(AppError::authorization(
                "Only the booking's recipient can rate it",
            ));
        }

        self.booking_repo
            .rate(booking_id, rating, feedback.as_deref())
            .await
    }

    /// Fetch one booking; parties only.
    pub async fn get(&self, ctx: &RequestContext, booking_id: Uuid) -> Result<Booking, AppError> {
        let booking = self.load_booking(booking_id).await?;
        if !booking.involves(ctx.user_id) && !ctx.is_admin() {
            return Err(AppError::authorization("Not a party to this booking"));
        }
        Ok(booking)
    }

    /// The current recipient's bookings.
    pub async fn list_mine(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<Booking>, AppError> {
        self.booking_repo.find_by_recipient(ctx.user_id, &page).await
    }

    /// All bookings against a listing, with derived flags. Owner-only.
    pub async fn list_for_listing(
        &self,
        ctx: &RequestContext,
        listing_id: Uuid,
    ) -> Result<Vec<BookingView>, AppError> {
        let listing = self
            .listing_repo
            .find_by_id(listing_id)
            .await?
            .ok_or_else(|| AppError::not_found("Listing not found"))?;
        if listing.provider_id != ctx.user_id && !ctx.is_admin() {
            return Err(AppError::authorization(
                "Only the listing's provider can view its bookings",
            ));
        }

        let now = Utc::now();
        let bookings = self.booking_repo.find_by_listing(listing_id).await?;
        Ok(bookings
            .into_iter()
            .map(|b| BookingView::derive(b, now))
            .collect())
    }

    async fn load_booking(&self, booking_id: Uuid) -> Result<Booking, AppError> {
        self.booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking not found"))
    }
}
