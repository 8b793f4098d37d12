//! Listing and NGO-exclusivity configuration.

use serde::{Deserialize, Serialize};

/// Food listing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Quantity above which a listing becomes NGO-exclusive and triggers
    /// the NGO email fan-out.
    #[serde(default = "default_ngo_threshold")]
    pub ngo_threshold: i32,
    /// Duration of the NGO-exclusive visibility window, in minutes.
    #[serde(default = "default_ngo_window")]
    pub ngo_exclusive_window_minutes: u64,
}

fn default_ngo_threshold() -> i32 {
    50
}

fn default_ngo_window() -> u64 {
    120
}
