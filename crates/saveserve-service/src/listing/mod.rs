//! Listing management and NGO bulk alerts.

pub mod ngo;
pub mod service;

pub use ngo::NgoAlertService;
pub use service::ListingService;
