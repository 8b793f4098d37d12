//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the background worker runs in this process.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Days a read notification is retained before cleanup.
    #[serde(default = "default_notification_retention")]
    pub notification_retention_days: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_notification_retention() -> u64 {
    30
}
