//! Per-user cumulative activity counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Cumulative counters for one user, upserted as activity happens.
///
/// Provider-side counters (`listings_posted`, `donations_completed`,
/// `quantity_donated`) and recipient-side counters (`bookings_made`,
/// `collections_completed`, `quantity_collected`) live in the same row;
/// the irrelevant side simply stays zero.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserStats {
    /// Owning user.
    pub user_id: Uuid,
    /// Listings this provider has posted.
    pub listings_posted: i64,
    /// Bookings this recipient has requested.
    pub bookings_made: i64,
    /// Pickups this recipient has completed.
    pub collections_completed: i64,
    /// Donations this provider has seen collected.
    pub donations_completed: i64,
    /// Total quantity donated (provider side).
    pub quantity_donated: i64,
    /// Total quantity collected (recipient side).
    pub quantity_collected: i64,
    /// Last counter update.
    pub updated_at: DateTime<Utc>,
}

impl UserStats {
    /// An all-zero stats row for users with no recorded activity yet.
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            listings_posted: 0,
            bookings_made: 0,
            collections_completed: 0,
            donations_completed: 0,
            quantity_donated: 0,
            quantity_collected: 0,
            updated_at: Utc::now(),
        }
    }
}
