//! Food listing entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::category::{ListingCategory, ListingUnit};
use super::status::ListingStatus;

/// A provider's posted quantity of surplus food.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FoodListing {
    /// Unique listing identifier.
    pub id: Uuid,
    /// Owning provider.
    pub provider_id: Uuid,
    /// Provider display name at posting time.
    pub provider_name: String,
    /// Short title.
    pub title: String,
    /// Longer free-text description.
    pub description: Option<String>,
    /// Food category.
    pub category: ListingCategory,
    /// Remaining quantity. Zeroed when the listing completes.
    pub quantity: i32,
    /// Unit the quantity is measured in.
    pub unit: ListingUnit,
    /// Start of the freshness window.
    pub available_from: DateTime<Utc>,
    /// End of the freshness window; the listing expires at this instant.
    pub available_until: DateTime<Utc>,
    /// Pickup location, human-readable.
    pub location: String,
    /// Geocoded latitude, if known.
    pub latitude: Option<f64>,
    /// Geocoded longitude, if known.
    pub longitude: Option<f64>,
    /// Hosted image URL, if any.
    pub image_url: Option<String>,
    /// Availability status.
    pub status: ListingStatus,
    /// Soft-delete flag.
    pub is_active: bool,
    /// Whether the listing is currently NGO-exclusive.
    pub is_ngo_exclusive: bool,
    /// End of the NGO-exclusive window, if one was opened.
    pub ngo_exclusive_until: Option<DateTime<Utc>>,
    /// When the listing was created.
    pub created_at: DateTime<Utc>,
    /// When the listing was last updated.
    pub updated_at: DateTime<Utc>,
}

impl FoodListing {
    /// Whether the freshness window has elapsed.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.available_until
    }

    /// Whether the listing can accept a new booking request right now.
    pub fn is_bookable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.status == ListingStatus::Available && !self.is_expired_at(now)
    }

    /// Whether the NGO-exclusive window is open at `now`.
    pub fn in_ngo_window_at(&self, now: DateTime<Utc>) -> bool {
        self.is_ngo_exclusive
            && self
                .ngo_exclusive_until
                .map(|until| now < until)
                .unwrap_or(false)
    }
}

/// Decide NGO exclusivity for a quantity.
///
/// A listing is NGO-exclusive iff its quantity exceeds the configured bulk
/// threshold. Every write path that changes quantity must go through this
/// predicate so the flag can never drift from the quantity.
pub fn crosses_bulk_threshold(quantity: i32, threshold: i32) -> bool {
    quantity > threshold
}

/// NGO exclusivity fields derived from a quantity at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NgoExclusivity {
    /// Whether the listing is NGO-exclusive.
    pub is_exclusive: bool,
    /// When the exclusivity window closes, if exclusive.
    pub until: Option<DateTime<Utc>>,
}

impl NgoExclusivity {
    /// Evaluate exclusivity for a quantity written at `now`.
    pub fn evaluate(quantity: i32, threshold: i32, window_minutes: u64, now: DateTime<Utc>) -> Self {
        if crosses_bulk_threshold(quantity, threshold) {
            Self {
                is_exclusive: true,
                until: Some(now + Duration::minutes(window_minutes as i64)),
            }
        } else {
            Self {
                is_exclusive: false,
                until: None,
            }
        }
    }
}

/// Data required to create a new listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListing {
    /// Short title.
    pub title: String,
    /// Longer free-text description.
    pub description: Option<String>,
    /// Food category.
    pub category: ListingCategory,
    /// Posted quantity.
    pub quantity: i32,
    /// Unit the quantity is measured in.
    pub unit: ListingUnit,
    /// Start of the freshness window.
    pub available_from: DateTime<Utc>,
    /// End of the freshness window.
    pub available_until: DateTime<Utc>,
    /// Pickup location.
    pub location: String,
    /// Geocoded latitude.
    pub latitude: Option<f64>,
    /// Geocoded longitude.
    pub longitude: Option<f64>,
    /// Hosted image URL.
    pub image_url: Option<String>,
}

/// Fields an owner may update on an existing listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateListing {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New quantity; re-evaluates NGO exclusivity.
    pub quantity: Option<i32>,
    /// New end of the freshness window.
    pub available_until: Option<DateTime<Utc>>,
    /// New pickup location.
    pub location: Option<String>,
    /// New image URL.
    pub image_url: Option<String>,
}
