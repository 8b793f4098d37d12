//! # saveserve-service
//!
//! Business services over the repositories: booking lifecycle, collection
//! verification, QR tokens, listings with NGO bulk alerts, notifications,
//! user accounts, and the outbound email relay.
//!
//! Services authorize the caller (via [`context::RequestContext`]), decide
//! *what* should happen, and leave the atomicity of multi-entity writes to
//! the repository transactions. Post-commit side effects (push
//! notifications, email) are spawned fire-and-forget and never affect the
//! caller's result.

pub mod booking;
pub mod context;
pub mod email;
pub mod listing;
pub mod notification;
pub mod user;
