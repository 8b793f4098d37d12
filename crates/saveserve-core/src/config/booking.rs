//! Booking lifecycle and QR verification configuration.

use serde::{Deserialize, Serialize};

/// Booking and collection-verification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Server-side secret mixed into the QR payload hash.
    #[serde(default = "default_qr_secret")]
    pub qr_secret: String,
    /// How long an approval QR code stays valid, in hours. The effective
    /// expiry is clamped to the listing's freshness window.
    #[serde(default = "default_qr_ttl")]
    pub qr_ttl_hours: u64,
}

fn default_qr_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_qr_ttl() -> u64 {
    24
}
