//! # saveserve-entity
//!
//! Domain entity models for SaveServe: users, sessions, food listings,
//! bookings, and notifications. Structs map 1:1 to database rows via
//! `sqlx::FromRow`; enums map to PostgreSQL enum types.
//!
//! The booking status state machine lives here as pure code so it can be
//! unit-tested without a database.

pub mod booking;
pub mod listing;
pub mod notification;
pub mod session;
pub mod stats;
pub mod user;
