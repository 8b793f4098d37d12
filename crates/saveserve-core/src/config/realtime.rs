//! Real-time WebSocket configuration.

use serde::{Deserialize, Serialize};

/// Real-time push configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum concurrent sockets per user; the oldest is dropped beyond
    /// this.
    #[serde(default = "default_max_per_user")]
    pub max_connections_per_user: usize,
    /// Outbound per-socket message buffer size.
    #[serde(default = "default_buffer")]
    pub send_buffer_size: usize,
}

fn default_max_per_user() -> usize {
    4
}

fn default_buffer() -> usize {
    64
}
