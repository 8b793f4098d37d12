//! Notification inbox and best-effort push dispatch.

pub mod service;

pub use service::NotificationService;
