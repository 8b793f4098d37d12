//! Booking status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle states of a booking.
///
/// Transitions are one-directional:
///
/// ```text
/// pending  -> approved | rejected | cancelled
/// approved -> collected | cancelled | expired
/// ```
///
/// `rejected`, `collected`, `expired`, and `cancelled` are terminal, and no
/// edge re-enters `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Requested by a recipient, awaiting provider decision.
    Pending,
    /// Approved by the provider; holds the listing until pickup or expiry.
    Approved,
    /// Declined by the provider.
    Rejected,
    /// Pickup verified; the booking is fulfilled.
    Collected,
    /// The approval QR expired before pickup.
    Expired,
    /// Withdrawn by either party before pickup.
    Cancelled,
}

impl BookingStatus {
    /// Whether a transition from `self` to `next` is legal.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Approved, Collected)
                | (Approved, Cancelled)
                | (Approved, Expired)
        )
    }

    /// Whether this state accepts no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::Collected | Self::Expired | Self::Cancelled
        )
    }

    /// Whether cancellation is permitted from this state.
    pub fn can_cancel(&self) -> bool {
        self.can_transition_to(Self::Cancelled)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Collected => "collected",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = saveserve_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "collected" => Ok(Self::Collected),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(saveserve_core::AppError::validation(format!(
                "Invalid booking status: '{s}'"
            ))),
        }
    }
}
