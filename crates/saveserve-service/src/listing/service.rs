//! Food listing management.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use saveserve_core::config::listing::ListingConfig;
use saveserve_core::error::AppError;
use saveserve_core::types::pagination::{PageRequest, PageResponse};
use saveserve_database::repositories::listing::ListingRepository;
use saveserve_database::repositories::stats::StatsRepository;
use saveserve_database::repositories::user::UserRepository;
use saveserve_entity::listing::model::{CreateListing, FoodListing, NgoExclusivity, UpdateListing};

use crate::context::RequestContext;

use super::ngo::NgoAlertService;

/// Manages food listings: creation with NGO-exclusivity enforcement,
/// visibility-filtered browsing, owner edits, and the consistency check.
#[derive(Debug, Clone)]
pub struct ListingService {
    listing_repo: Arc<ListingRepository>,
    user_repo: Arc<UserRepository>,
    stats_repo: Arc<StatsRepository>,
    ngo_alerts: Arc<NgoAlertService>,
    config: ListingConfig,
}

impl ListingService {
    /// Creates a new listing service.
    pub fn new(
        listing_repo: Arc<ListingRepository>,
        user_repo: Arc<UserRepository>,
        stats_repo: Arc<StatsRepository>,
        ngo_alerts: Arc<NgoAlertService>,
        config: ListingConfig,
    ) -> Self {
        Self {
            listing_repo,
            user_repo,
            stats_repo,
            ngo_alerts,
            config,
        }
    }

    /// Post a new listing. Provider-only.
    ///
    /// NGO exclusivity is evaluated from the quantity here, at the write
    /// path; if the bulk threshold is crossed, the NGO email fan-out is
    /// spawned in the background (best-effort).
    pub async fn create(
        &self,
        ctx: &RequestContext,
        create: CreateListing,
    ) -> Result<FoodListing, AppError> {
        if !ctx.is_provider() {
            return Err(AppError::authorization("Only providers can post listings"));
        }
        if create.quantity < 1 {
            return Err(AppError::validation("Quantity must be at least 1"));
        }
        if create.available_until <= create.available_from {
            return Err(AppError::validation(
                "Freshness window must end after it starts",
            ));
        }
        if create.available_until <= Utc::now() {
            return Err(AppError::validation(
                "Freshness window must end in the future",
            ));
        }

        let provider = self
            .user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::authentication("Account no longer exists"))?;

        let exclusivity = NgoExclusivity::evaluate(
            create.quantity,
            self.config.ngo_threshold,
            self.config.ngo_exclusive_window_minutes,
            Utc::now(),
        );

        let listing = self
            .listing_repo
            .create(ctx.user_id, provider.public_name(), &create, exclusivity)
            .await?;

        self.stats_repo.incr_listings_posted(ctx.user_id).await?;
        info!(listing_id = %listing.id, ngo_exclusive = listing.is_ngo_exclusive, "Listing posted");

        if listing.is_ngo_exclusive {
            let alerts = Arc::clone(&self.ngo_alerts);
            let snapshot = listing.clone();
            tokio::spawn(async move {
                alerts.alert_ngos(&snapshot).await;
            });
        }

        Ok(listing)
    }

    /// Browse bookable listings. NGO-exclusive listings inside their
    /// window are visible only to NGO recipients, admins, and providers
    /// (providers see the market they post into).
    pub async fn browse(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<FoodListing>, AppError> {
        let include_ngo_exclusive = ctx.is_ngo() || ctx.is_admin() || ctx.is_provider();
        self.listing_repo
            .browse(include_ngo_exclusive, Utc::now(), &page)
            .await
    }

    /// Fetch a single listing. NGO-window visibility applies here too.
    pub async fn get(&self, ctx: &RequestContext, listing_id: Uuid) -> Result<FoodListing, AppError> {
        let listing = self.load(listing_id).await?;
        let now = Utc::now();
        if listing.in_ngo_window_at(now)
            && !(ctx.is_ngo() || ctx.is_admin() || listing.provider_id == ctx.user_id)
        {
            return Err(AppError::authorization(
                "Listing is currently reserved for NGO recipients",
            ));
        }
        Ok(listing)
    }

    /// The current provider's listings, including inactive ones.
    pub async fn list_mine(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<FoodListing>, AppError> {
        self.listing_repo.find_by_provider(ctx.user_id, &page).await
    }

    /// Owner edits. A quantity change re-evaluates NGO exclusivity so the
    /// invariant holds on every write path.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        listing_id: Uuid,
        update: UpdateListing,
    ) -> Result<FoodListing, AppError> {
        let listing = self.load(listing_id).await?;
        if listing.provider_id != ctx.user_id {
            return Err(AppError::authorization(
                "Only the listing's provider can edit it",
            ));
        }

        if let Some(quantity) = update.quantity {
            if quantity < 1 {
                return Err(AppError::validation("Quantity must be at least 1"));
            }
        }

        let exclusivity = update.quantity.map(|quantity| {
            NgoExclusivity::evaluate(
                quantity,
                self.config.ngo_threshold,
                self.config.ngo_exclusive_window_minutes,
                Utc::now(),
            )
        });

        let was_exclusive = listing.is_ngo_exclusive;
        let updated = self
            .listing_repo
            .update(listing_id, &update, exclusivity)
            .await?;

        if updated.is_ngo_exclusive && !was_exclusive {
            let alerts = Arc::clone(&self.ngo_alerts);
            let snapshot = updated.clone();
            tokio::spawn(async move {
                alerts.alert_ngos(&snapshot).await;
            });
        }

        Ok(updated)
    }

    /// Soft-remove a listing. Owner-only; refused while a booking holds it.
    pub async fn deactivate(
        &self,
        ctx: &RequestContext,
        listing_id: Uuid,
    ) -> Result<FoodListing, AppError> {
        let listing = self.load(listing_id).await?;
        if listing.provider_id != ctx.user_id && !ctx.is_admin() {
            return Err(AppError::authorization(
                "Only the listing's provider can remove it",
            ));
        }
        self.listing_repo.deactivate(listing_id).await
    }

    /// Admin consistency check: listings whose NGO flag disagrees with the
    /// threshold predicate. Always empty while the write paths enforce the
    /// invariant.
    pub async fn ngo_consistency(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<FoodListing>, AppError> {
        if !ctx.is_admin() {
            return Err(AppError::authorization("Admin only"));
        }
        self.listing_repo
            .ngo_consistency_violations(self.config.ngo_threshold)
            .await
    }

    async fn load(&self, listing_id: Uuid) -> Result<FoodListing, AppError> {
        self.listing_repo
            .find_by_id(listing_id)
            .await?
            .ok_or_else(|| AppError::not_found("Listing not found"))
    }
}
