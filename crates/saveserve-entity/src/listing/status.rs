//! Listing availability status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Availability state of a food listing.
///
/// A listing is held by at most one approved booking at a time: approval
/// flips `Available -> Booked`, rejection or cancellation of the holding
/// booking flips it back, and collection verification ends it at
/// `Completed`. `Expired` is set by the freshness sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    /// Open for booking requests.
    Available,
    /// Held by an approved booking awaiting pickup.
    Booked,
    /// Collected; terminal.
    Completed,
    /// Freshness window elapsed; terminal.
    Expired,
}

impl ListingStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
            Self::Completed => "completed",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
