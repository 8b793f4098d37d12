//! Email relay configuration.

use serde::{Deserialize, Serialize};

/// Outbound email configuration.
///
/// Mail is sent through an HTTP relay (JSON POST). Disabled by default;
/// when disabled, sends are logged and dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Whether outbound email is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Relay endpoint URL.
    #[serde(default)]
    pub relay_url: String,
    /// API key sent as a bearer token to the relay.
    #[serde(default)]
    pub api_key: String,
    /// From address.
    #[serde(default = "default_from")]
    pub from_address: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_from() -> String {
    "noreply@saveserve.local".to_string()
}

fn default_timeout() -> u64 {
    10
}
