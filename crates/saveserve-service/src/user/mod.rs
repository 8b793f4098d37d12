//! User accounts and profiles.

pub mod service;

pub use service::UserService;
