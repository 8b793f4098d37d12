//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use saveserve_auth::jwt::decoder::JwtDecoder;
use saveserve_auth::session::manager::SessionManager;
use saveserve_core::config::AppConfig;
use saveserve_realtime::RealtimeHub;
use saveserve_service::booking::{BookingService, CollectionService};
use saveserve_service::listing::ListingService;
use saveserve_service::notification::NotificationService;
use saveserve_service::user::UserService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool (health checks).
    pub db_pool: PgPool,

    /// JWT token decoder and validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Session lifecycle manager.
    pub session_manager: Arc<SessionManager>,
    /// Realtime push hub.
    pub hub: Arc<RealtimeHub>,

    /// User account service.
    pub user_service: Arc<UserService>,
    /// Listing service.
    pub listing_service: Arc<ListingService>,
    /// Booking lifecycle service.
    pub booking_service: Arc<BookingService>,
    /// Collection verification service.
    pub collection_service: Arc<CollectionService>,
    /// Notification service.
    pub notification_service: Arc<NotificationService>,
}
