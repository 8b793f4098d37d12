//! Outbound realtime message types.

use serde::{Deserialize, Serialize};

use saveserve_entity::notification::Notification;

/// A message pushed to a connected client socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// A new notification for the user.
    Notification {
        /// The persisted notification record.
        notification: Notification,
    },
    /// The user's unread notification count changed.
    UnreadCount {
        /// Current unread count.
        count: i64,
    },
    /// Server-side keepalive.
    Ping,
}

impl OutboundMessage {
    /// Serialize to the JSON wire form.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{\"type\":\"ping\"}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_tags() {
        let json = OutboundMessage::UnreadCount { count: 3 }.to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "unread_count");
        assert_eq!(value["count"], 3);
    }
}
