//! Per-user connection registry.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, trace};
use uuid::Uuid;

use saveserve_core::config::realtime::RealtimeConfig;

use crate::message::OutboundMessage;

/// One registered socket's sending half.
#[derive(Debug)]
struct ConnectionHandle {
    /// Unique per-socket identifier.
    id: Uuid,
    /// Bounded channel into the socket's writer task.
    sender: mpsc::Sender<OutboundMessage>,
}

/// Registry of connected user sockets.
///
/// A user may hold several sockets (multiple tabs/devices) up to the
/// configured cap; `send_to_user` fans out to all of them. Sends never
/// block: a full buffer drops the message, which is acceptable for a
/// best-effort push channel backed by the notification inbox.
#[derive(Debug)]
pub struct RealtimeHub {
    connections: DashMap<Uuid, Vec<ConnectionHandle>>,
    max_per_user: usize,
    buffer_size: usize,
}

impl RealtimeHub {
    /// Create a new hub from configuration.
    pub fn new(config: &RealtimeConfig) -> Self {
        Self {
            connections: DashMap::new(),
            max_per_user: config.max_connections_per_user.max(1),
            buffer_size: config.send_buffer_size.max(1),
        }
    }

    /// Register a socket for `user_id`.
    ///
    /// Returns the connection id (pass it back to [`Self::unregister`])
    /// and the receiving half the socket writer should drain. If the user
    /// is at the connection cap, the oldest socket is disconnected by
    /// dropping its sender.
    pub fn register(&self, user_id: Uuid) -> (Uuid, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let handle = ConnectionHandle {
            id: Uuid::new_v4(),
            sender: tx,
        };
        let connection_id = handle.id;

        let mut entry = self.connections.entry(user_id).or_default();
        if entry.len() >= self.max_per_user {
            let dropped = entry.remove(0);
            debug!(%user_id, connection = %dropped.id, "Dropped oldest socket at connection cap");
        }
        entry.push(handle);

        debug!(%user_id, connection = %connection_id, "Socket registered");
        (connection_id, rx)
    }

    /// Remove a socket registration.
    pub fn unregister(&self, user_id: Uuid, connection_id: Uuid) {
        if let Some(mut entry) = self.connections.get_mut(&user_id) {
            entry.retain(|c| c.id != connection_id);
            let empty = entry.is_empty();
            drop(entry);
            if empty {
                self.connections.remove_if(&user_id, |_, v| v.is_empty());
            }
        }
        debug!(%user_id, connection = %connection_id, "Socket unregistered");
    }

    /// Whether the user has at least one live socket.
    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.connections
            .get(&user_id)
            .map(|c| !c.is_empty())
            .unwrap_or(false)
    }

    /// Push a message to every socket of one user. Best-effort: full or
    /// closed channels are skipped.
    pub fn send_to_user(&self, user_id: Uuid, msg: &OutboundMessage) {
        if let Some(entry) = self.connections.get(&user_id) {
            for conn in entry.iter() {
                if conn.sender.try_send(msg.clone()).is_err() {
                    trace!(%user_id, connection = %conn.id, "Dropped realtime message");
                }
            }
        }
    }

    /// Push a message to every connected user.
    pub fn broadcast(&self, msg: &OutboundMessage) {
        for entry in self.connections.iter() {
            for conn in entry.value() {
                let _ = conn.sender.try_send(msg.clone());
            }
        }
    }

    /// Number of live sockets across all users.
    pub fn connection_count(&self) -> usize {
        self.connections.iter().map(|e| e.value().len()).sum()
    }

    /// Number of users with at least one live socket.
    pub fn online_user_count(&self) -> usize {
        self.connections.iter().filter(|e| !e.value().is_empty()).count()
    }
}
