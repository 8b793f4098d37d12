//! Booking repository implementation.
//!
//! Every multi-entity state transition (create, approve, reject, cancel,
//! verify collection, expiry sweep) runs as a single transaction owned by
//! the repository method, with its precondition checks done inside the
//! transaction against row-locked data. Listing holds are flipped with
//! conditional updates, so two racing approvals can never both take the
//! same listing.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use saveserve_core::error::{AppError, ErrorKind};
use saveserve_core::result::AppResult;
use saveserve_core::types::pagination::{PageRequest, PageResponse};
use saveserve_entity::booking::{Booking, BookingStatus};
use saveserve_entity::listing::FoodListing;

/// How the booking was identified at the pickup point.
#[derive(Debug, Clone)]
pub enum CollectionResolution {
    /// Resolved from a verified QR payload.
    ByBookingId(Uuid),
    /// Resolved from the 6-digit backup code handed out at approval.
    ByCode(String),
}

/// Credentials written onto a booking at approval time.
#[derive(Debug, Clone)]
pub struct ApprovalCredentials {
    /// Signed QR payload.
    pub qr_payload: String,
    /// QR expiry deadline.
    pub qr_expires_at: DateTime<Utc>,
    /// 6-digit backup collection code.
    pub collection_code: String,
}

/// Outcome of a successful collection verification.
#[derive(Debug, Clone)]
pub struct CollectionOutcome {
    /// The collected booking.
    pub booking: Booking,
    /// The completed listing.
    pub listing: FoodListing,
}

/// Repository for booking lifecycle operations.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    /// Create a new booking repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a booking request against a listing.
    ///
    /// The listing checks (active, available, unexpired, enough quantity,
    /// NGO window) run inside the transaction so a concurrent listing
    /// mutation cannot slip between check and insert. `caller_is_ngo`
    /// decides NGO-window access.
    pub async fn create(
        &self,
        listing_id: Uuid,
        recipient_id: Uuid,
        recipient_name: &str,
        caller_is_ngo: bool,
        requested_quantity: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Booking> {
        let mut tx = self.begin().await?;

        let listing = Self::lock_listing(&mut tx, listing_id).await?;

        if listing.provider_id == recipient_id {
            return Err(AppError::validation("You cannot book your own listing"));
        }
        if !listing.is_bookable_at(now) {
            return Err(AppError::validation(
                "Listing is no longer available for booking",
            ));
        }
        if listing.in_ngo_window_at(now) && !caller_is_ngo {
            return Err(AppError::authorization(
                "Listing is currently reserved for NGO recipients",
            ));
        }
        if requested_quantity > listing.quantity {
            return Err(AppError::validation(format!(
                "Requested quantity {} exceeds the available {}",
                requested_quantity, listing.quantity
            )));
        }

        let booking = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings \
                (listing_id, provider_id, recipient_id, listing_title, provider_name, \
                 recipient_name, requested_quantity) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(listing_id)
        .bind(listing.provider_id)
        .bind(recipient_id)
        .bind(&listing.title)
        .bind(&listing.provider_name)
        .bind(recipient_name)
        .bind(requested_quantity)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create booking", e))?;

        sqlx::query(
            "INSERT INTO user_stats (user_id, bookings_made) VALUES ($1, 1) \
             ON CONFLICT (user_id) DO UPDATE SET \
                bookings_made = user_stats.bookings_made + 1, updated_at = NOW()",
        )
        .bind(recipient_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to bump stats", e))?;

        self.commit(tx).await?;
        Ok(booking)
    }

    /// Find a booking by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find booking", e))
    }

    /// All bookings against a listing, oldest request first.
    pub async fn find_by_listing(&self, listing_id: Uuid) -> AppResult<Vec<Booking>> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE listing_id = $1 ORDER BY requested_at ASC",
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list bookings for listing", e)
        })
    }

    /// A recipient's bookings, newest first.
    pub async fn find_by_recipient(
        &self,
        recipient_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Booking>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE recipient_id = $1")
                .bind(recipient_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count bookings", e)
                })?;

        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE recipient_id = $1 \
             ORDER BY requested_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(recipient_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list bookings", e))?;

        Ok(PageResponse::new(
            bookings,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Approve a pending booking and take the listing hold.
    ///
    /// The listing flip `available -> booked` is a conditional update; if
    /// another approval already took the hold, zero rows match and the
    /// whole transaction aborts with a conflict.
    pub async fn approve(
        &self,
        booking_id: Uuid,
        provider_response: Option<&str>,
        credentials: &ApprovalCredentials,
        now: DateTime<Utc>,
    ) -> AppResult<Booking> {
        let mut tx = self.begin().await?;

        let booking = Self::lock_booking(&mut tx, booking_id).await?;
        if booking.status != BookingStatus::Pending {
            return Err(AppError::validation(format!(
                "Cannot approve a booking in status '{}'",
                booking.status
            )));
        }

        let listing = Self::lock_listing(&mut tx, booking.listing_id).await?;
        if !listing.is_active || listing.is_expired_at(now) {
            return Err(AppError::validation(
                "Listing has expired and can no longer be approved",
            ));
        }
        if booking.requested_quantity > listing.quantity {
            return Err(AppError::validation(format!(
                "Requested quantity {} exceeds the available {}",
                booking.requested_quantity, listing.quantity
            )));
        }

        let held = sqlx::query(
            "UPDATE food_listings SET status = 'booked', updated_at = NOW() \
             WHERE id = $1 AND status = 'available'",
        )
        .bind(listing.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to hold listing", e))?;

        if held.rows_affected() == 0 {
            return Err(AppError::conflict(
                "Listing is already booked by another approval",
            ));
        }

        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET \
                status = 'approved', \
                approved_quantity = requested_quantity, \
                provider_response = $2, \
                qr_payload = $3, \
                qr_expires_at = $4, \
                collection_code = $5, \
                approved_at = $6, \
                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(booking_id)
        .bind(provider_response)
        .bind(&credentials.qr_payload)
        .bind(credentials.qr_expires_at)
        .bind(&credentials.collection_code)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to approve booking", e))?;

        self.commit(tx).await?;
        Ok(booking)
    }

    /// Reject a pending booking. Pending bookings hold no listing, so the
    /// listing row is untouched.
    pub async fn reject(
        &self,
        booking_id: Uuid,
        provider_response: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<Booking> {
        let mut tx = self.begin().await?;

        let booking = Self::lock_booking(&mut tx, booking_id).await?;
        if booking.status != BookingStatus::Pending {
            return Err(AppError::validation(format!(
                "Cannot reject a booking in status '{}'",
                booking.status
            )));
        }

        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET \
                status = 'rejected', provider_response = $2, rejected_at = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(booking_id)
        .bind(provider_response)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reject booking", e))?;

        self.commit(tx).await?;
        Ok(booking)
    }

    /// Cancel a pending or approved booking; an approved booking releases
    /// its listing hold.
    pub async fn cancel(&self, booking_id: Uuid, now: DateTime<Utc>) -> AppResult<Booking> {
        let mut tx = self.begin().await?;

        let booking = Self::lock_booking(&mut tx, booking_id).await?;
        if !booking.status.can_cancel() {
            return Err(AppError::validation(format!(
                "Cannot cancel a booking in status '{}'",
                booking.status
            )));
        }
        let held_listing = booking.status == BookingStatus::Approved;

        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'cancelled', cancelled_at = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(booking_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to cancel booking", e))?;

        if held_listing {
            Self::release_listing(&mut tx, booking.listing_id).await?;
        }

        self.commit(tx).await?;
        Ok(booking)
    }

    /// Attach a post-collection rating. One-shot.
    pub async fn rate(
        &self,
        booking_id: Uuid,
        rating: i16,
        feedback: Option<&str>,
    ) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET rating = $2, feedback = $3, updated_at = NOW() \
             WHERE id = $1 AND status = 'collected' AND rating IS NULL RETURNING *",
        )
        .bind(booking_id)
        .bind(rating)
        .bind(feedback)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rate booking", e))?
        .ok_or_else(|| AppError::validation("Only an unrated, collected booking can be rated"))
    }

    /// Verify a pickup and finalize the booking.
    ///
    /// On success the booking becomes `collected`, the listing is
    /// force-zeroed and `completed`, and both parties' cumulative stats are
    /// updated — all in one transaction. An expired QR is the one failure
    /// that still writes: the booking is flipped to `expired`, its listing
    /// hold released, that much committed, and the call then fails.
    pub async fn verify_collection(
        &self,
        listing_id: Uuid,
        verifier_id: Uuid,
        resolution: CollectionResolution,
        now: DateTime<Utc>,
    ) -> AppResult<CollectionOutcome> {
        let mut tx = self.begin().await?;

        let listing = Self::lock_listing(&mut tx, listing_id).await?;
        if listing.provider_id != verifier_id {
            return Err(AppError::authorization(
                "Only the listing's provider can verify collection",
            ));
        }

        let booking = match resolution {
            CollectionResolution::ByBookingId(id) => Self::lock_booking(&mut tx, id).await?,
            CollectionResolution::ByCode(ref code) => sqlx::query_as::<_, Booking>(
                "SELECT * FROM bookings WHERE listing_id = $1 AND collection_code = $2 \
                 ORDER BY created_at DESC LIMIT 1 FOR UPDATE",
            )
            .bind(listing_id)
            .bind(code)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to resolve collection code", e)
            })?
            .ok_or_else(|| AppError::validation("Invalid collection code for this listing"))?,
        };

        if booking.listing_id != listing_id {
            return Err(AppError::validation(
                "Booking does not belong to this listing",
            ));
        }
        if booking.status == BookingStatus::Collected {
            return Err(AppError::validation("Booking has already been collected"));
        }
        if booking.status != BookingStatus::Approved {
            return Err(AppError::validation(format!(
                "Booking is not approved for collection (status '{}')",
                booking.status
            )));
        }
        if booking.is_qr_expired_at(now) {
            // The expiry transition is a persisted side effect of the failed
            // verification: commit it, then report the failure.
            sqlx::query(
                "UPDATE bookings SET status = 'expired', updated_at = NOW() WHERE id = $1",
            )
            .bind(booking.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to expire booking", e)
            })?;
            Self::release_listing(&mut tx, listing_id).await?;
            self.commit(tx).await?;
            return Err(AppError::validation(
                "QR code has expired; the booking is no longer collectable",
            ));
        }

        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET \
                status = 'collected', collected_by = $2, collected_at = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(booking.id)
        .bind(verifier_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to collect booking", e))?;

        let listing = sqlx::query_as::<_, FoodListing>(
            "UPDATE food_listings SET quantity = 0, status = 'completed', updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(listing_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to complete listing", e))?;

        let quantity = i64::from(booking.approved_quantity);
        sqlx::query(
            "INSERT INTO user_stats (user_id, collections_completed, quantity_collected) \
             VALUES ($1, 1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET \
                collections_completed = user_stats.collections_completed + 1, \
                quantity_collected = user_stats.quantity_collected + EXCLUDED.quantity_collected, \
                updated_at = NOW()",
        )
        .bind(booking.recipient_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update recipient stats", e)
        })?;

        sqlx::query(
            "INSERT INTO user_stats (user_id, donations_completed, quantity_donated) \
             VALUES ($1, 1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET \
                donations_completed = user_stats.donations_completed + 1, \
                quantity_donated = user_stats.quantity_donated + EXCLUDED.quantity_donated, \
                updated_at = NOW()",
        )
        .bind(booking.provider_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update provider stats", e)
        })?;

        self.commit(tx).await?;
        Ok(CollectionOutcome { booking, listing })
    }

    /// Sweep: expire approved bookings whose QR deadline has passed and
    /// release their listing holds. Returns the expired bookings so the
    /// caller can notify.
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<Booking>> {
        let mut tx = self.begin().await?;

        let expired = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'expired', updated_at = NOW() \
             WHERE status = 'approved' AND qr_expires_at <= $1 RETURNING *",
        )
        .bind(now)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to expire bookings", e))?;

        if !expired.is_empty() {
            let listing_ids: Vec<Uuid> = expired.iter().map(|b| b.listing_id).collect();
            sqlx::query(
                "UPDATE food_listings SET status = 'available', updated_at = NOW() \
                 WHERE id = ANY($1) AND status = 'booked'",
            )
            .bind(&listing_ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to release listings", e)
            })?;
        }

        self.commit(tx).await?;
        Ok(expired)
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e))
    }

    async fn commit(&self, tx: Transaction<'static, Postgres>) -> AppResult<()> {
        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e))
    }

    async fn lock_booking(
        tx: &mut Transaction<'static, Postgres>,
        id: Uuid,
    ) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load booking", e))?
            .ok_or_else(|| AppError::not_found("Booking not found"))
    }

    async fn lock_listing(
        tx: &mut Transaction<'static, Postgres>,
        id: Uuid,
    ) -> AppResult<FoodListing> {
        sqlx::query_as::<_, FoodListing>("SELECT * FROM food_listings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load listing", e))?
            .ok_or_else(|| AppError::not_found("Listing not found"))
    }

    /// Release a listing hold if this transaction's booking held it.
    async fn release_listing(
        tx: &mut Transaction<'static, Postgres>,
        listing_id: Uuid,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE food_listings SET status = 'available', updated_at = NOW() \
             WHERE id = $1 AND status = 'booked'",
        )
        .bind(listing_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to release listing", e))?;
        Ok(())
    }
}
