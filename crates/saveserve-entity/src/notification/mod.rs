//! Notification entity: model and category enum.

pub mod category;
pub mod model;

pub use category::NotificationCategory;
pub use model::{NewNotification, Notification};
