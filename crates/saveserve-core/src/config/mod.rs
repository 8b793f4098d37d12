//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod booking;
pub mod database;
pub mod email;
pub mod listing;
pub mod logging;
pub mod realtime;
pub mod session;
pub mod worker;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::auth::AuthConfig;
use self::booking::BookingConfig;
use self::database::DatabaseConfig;
use self::email::EmailConfig;
use self::listing::ListingConfig;
use self::logging::LoggingConfig;
use self::realtime::RealtimeConfig;
use self::session::SessionConfig;
use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Authentication settings.
    pub auth: AuthConfig,
    /// Session management settings.
    pub session: SessionConfig,
    /// Booking lifecycle and QR settings.
    pub booking: BookingConfig,
    /// Listing and NGO-exclusivity settings.
    pub listing: ListingConfig,
    /// Email relay settings.
    pub email: EmailConfig,
    /// Background worker settings.
    pub worker: WorkerConfig,
    /// Real-time WebSocket settings.
    pub realtime: RealtimeConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `SAVESERVE`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SAVESERVE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Load configuration from an explicit TOML file path, with env overrides.
    ///
    /// Used by the integration test harness, which carries its own fixture
    /// file instead of the `config/` directory.
    pub fn load_from(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("SAVESERVE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
