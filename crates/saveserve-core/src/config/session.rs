//! Session management configuration.

use serde::{Deserialize, Serialize};

/// Session lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in hours. Matches the refresh token TTL by default.
    #[serde(default = "default_session_ttl")]
    pub ttl_hours: u64,
    /// How long revoked/expired session rows are retained before cleanup,
    /// in days.
    #[serde(default = "default_retention")]
    pub retention_days: u64,
}

fn default_session_ttl() -> u64 {
    24
}

fn default_retention() -> u64 {
    7
}
