//! Outbound email via an HTTP relay.

pub mod client;

pub use client::EmailClient;
