//! # saveserve-realtime
//!
//! In-process realtime push: a per-user socket registry and the outbound
//! message types sent over it. Delivery is strictly best-effort — offline
//! users simply read their notification inbox later, and a full socket
//! buffer drops the message.

pub mod hub;
pub mod message;

pub use hub::RealtimeHub;
pub use message::OutboundMessage;
