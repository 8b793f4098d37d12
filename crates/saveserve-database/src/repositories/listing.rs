//! Food listing repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use saveserve_core::error::{AppError, ErrorKind};
use saveserve_core::result::AppResult;
use saveserve_core::types::pagination::{PageRequest, PageResponse};
use saveserve_entity::listing::model::{CreateListing, FoodListing, NgoExclusivity, UpdateListing};

/// Repository for food listing CRUD and sweep operations.
#[derive(Debug, Clone)]
pub struct ListingRepository {
    pool: PgPool,
}

impl ListingRepository {
    /// Create a new listing repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new listing with its NGO exclusivity already evaluated.
    pub async fn create(
        &self,
        provider_id: Uuid,
        provider_name: &str,
        listing: &CreateListing,
        exclusivity: NgoExclusivity,
    ) -> AppResult<FoodListing> {
        sqlx::query_as::<_, FoodListing>(
            "INSERT INTO food_listings \
                (provider_id, provider_name, title, description, category, quantity, unit, \
                 available_from, available_until, location, latitude, longitude, image_url, \
                 is_ngo_exclusive, ngo_exclusive_until) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING *",
        )
        .bind(provider_id)
        .bind(provider_name)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.category)
        .bind(listing.quantity)
        .bind(listing.unit)
        .bind(listing.available_from)
        .bind(listing.available_until)
        .bind(&listing.location)
        .bind(listing.latitude)
        .bind(listing.longitude)
        .bind(&listing.image_url)
        .bind(exclusivity.is_exclusive)
        .bind(exclusivity.until)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create listing", e))
    }

    /// Find a listing by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FoodListing>> {
        sqlx::query_as::<_, FoodListing>("SELECT * FROM food_listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find listing", e))
    }

    /// Browse active, available, unexpired listings.
    ///
    /// When `include_ngo_exclusive` is false, listings inside an open
    /// NGO-exclusive window are filtered out (non-NGO recipients must not
    /// see them).
    pub async fn browse(
        &self,
        include_ngo_exclusive: bool,
        now: DateTime<Utc>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FoodListing>> {
        let visibility = "is_active AND status = 'available' AND available_until > $1 \
             AND ($2 OR NOT (is_ngo_exclusive AND ngo_exclusive_until > $1))";

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM food_listings WHERE {visibility}"
        ))
        .bind(now)
        .bind(include_ngo_exclusive)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count listings", e))?;

        let listings = sqlx::query_as::<_, FoodListing>(&format!(
            "SELECT * FROM food_listings WHERE {visibility} \
             ORDER BY available_until ASC LIMIT $3 OFFSET $4"
        ))
        .bind(now)
        .bind(include_ngo_exclusive)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to browse listings", e))?;

        Ok(PageResponse::new(
            listings,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// All of a provider's listings, newest first.
    pub async fn find_by_provider(
        &self,
        provider_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FoodListing>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM food_listings WHERE provider_id = $1")
                .bind(provider_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count listings", e)
                })?;

        let listings = sqlx::query_as::<_, FoodListing>(
            "SELECT * FROM food_listings WHERE provider_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(provider_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list provider listings", e)
        })?;

        Ok(PageResponse::new(
            listings,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Apply owner edits, re-evaluated NGO exclusivity included.
    ///
    /// Quantity edits are only legal while the listing is `available`; the
    /// WHERE clause enforces that atomically.
    pub async fn update(
        &self,
        id: Uuid,
        update: &UpdateListing,
        exclusivity: Option<NgoExclusivity>,
    ) -> AppResult<FoodListing> {
        let (is_exclusive, until) = match exclusivity {
            Some(e) => (Some(e.is_exclusive), e.until),
            None => (None, None),
        };

        sqlx::query_as::<_, FoodListing>(
            "UPDATE food_listings SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                quantity = COALESCE($4, quantity), \
                available_until = COALESCE($5, available_until), \
                location = COALESCE($6, location), \
                image_url = COALESCE($7, image_url), \
                is_ngo_exclusive = COALESCE($8, is_ngo_exclusive), \
                ngo_exclusive_until = CASE WHEN $8 IS NULL THEN ngo_exclusive_until ELSE $9 END, \
                updated_at = NOW() \
             WHERE id = $1 AND status = 'available' RETURNING *",
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.quantity)
        .bind(update.available_until)
        .bind(&update.location)
        .bind(&update.image_url)
        .bind(is_exclusive)
        .bind(until)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update listing", e))?
        .ok_or_else(|| {
            AppError::validation("Listing can only be edited while it is available")
        })
    }

    /// Soft-deactivate a listing. Refused while an approved booking holds it.
    pub async fn deactivate(&self, id: Uuid) -> AppResult<FoodListing> {
        sqlx::query_as::<_, FoodListing>(
            "UPDATE food_listings SET is_active = FALSE, updated_at = NOW() \
             WHERE id = $1 AND status <> 'booked' RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to deactivate listing", e))?
        .ok_or_else(|| {
            AppError::validation("Listing cannot be removed while a booking holds it")
        })
    }

    /// Listings whose NGO-exclusivity flag disagrees with the threshold
    /// predicate. Under correct write-path enforcement this is always empty.
    ///
    /// A violation is either a flag set on a sub-threshold quantity, or a
    /// bulk quantity that never opened a window. Listings whose window was
    /// legitimately released (elapsed `ngo_exclusive_until`) are not
    /// violations.
    pub async fn ngo_consistency_violations(&self, threshold: i32) -> AppResult<Vec<FoodListing>> {
        sqlx::query_as::<_, FoodListing>(
            "SELECT * FROM food_listings \
             WHERE is_active AND status = 'available' AND ( \
                   (is_ngo_exclusive AND quantity <= $1) \
                OR (NOT is_ngo_exclusive AND quantity > $1 AND ngo_exclusive_until IS NULL) \
             )",
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to run consistency check", e)
        })
    }

    /// Sweep: expire listings whose freshness window has elapsed.
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE food_listings \
             SET status = 'expired', is_active = FALSE, updated_at = NOW() \
             WHERE available_until <= $1 AND status IN ('available', 'booked')",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to expire listings", e))?;
        Ok(result.rows_affected())
    }

    /// Sweep: close elapsed NGO-exclusive windows, opening the listings to
    /// general visibility.
    pub async fn release_ngo_windows(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE food_listings \
             SET is_ngo_exclusive = FALSE, updated_at = NOW() \
             WHERE is_ngo_exclusive AND ngo_exclusive_until <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to release NGO windows", e)
        })?;
        Ok(result.rows_affected())
    }
}
