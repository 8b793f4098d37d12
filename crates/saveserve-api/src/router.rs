//! Route definitions for the SaveServe HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`. The
//! router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_size_bytes as usize;

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(listing_routes())
        .merge(booking_routes())
        .merge(notification_routes())
        .merge(admin_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_upgrade));

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Auth endpoints: register, login, refresh, logout, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
}

/// User self-service endpoints
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(handlers::user::get_profile))
        .route("/users/me", put(handlers::user::update_profile))
        .route("/users/me/stats", get(handlers::user::get_stats))
}

/// Listing CRUD and booking views
fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/listings", get(handlers::listing::browse))
        .route("/listings", post(handlers::listing::create))
        .route("/listings/mine", get(handlers::listing::list_mine))
        .route("/listings/{id}", get(handlers::listing::get))
        .route("/listings/{id}", patch(handlers::listing::update))
        .route("/listings/{id}", delete(handlers::listing::deactivate))
        .route("/listings/{id}/bookings", get(handlers::listing::bookings))
}

/// Booking lifecycle endpoints
fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(handlers::booking::create))
        .route("/bookings/mine", get(handlers::booking::list_mine))
        .route(
            "/bookings/verify-collection",
            post(handlers::booking::verify_collection),
        )
        .route("/bookings/{id}", get(handlers::booking::get))
        .route(
            "/bookings/{id}/status",
            patch(handlers::booking::update_status),
        )
        .route("/bookings/{id}/cancel", patch(handlers::booking::cancel))
        .route("/bookings/{id}/rate", patch(handlers::booking::rate))
}

/// Notification endpoints
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(handlers::notification::list))
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
        .route(
            "/notifications/{id}",
            delete(handlers::notification::dismiss),
        )
}

/// Admin-only endpoints
fn admin_routes() -> Router<AppState> {
    Router::new().route(
        "/admin/listings/ngo-consistency",
        get(handlers::admin::ngo_consistency),
    )
}

/// Health check endpoints (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/detailed", get(handlers::health::detailed_health))
}

/// Build CORS layer from configuration
fn build_cors_layer(state: &AppState) -> CorsLayer {
    use http::Method;
    use tower_http::cors::Any;

    let cors_config = &state.config.server.cors;

    let mut cors = CorsLayer::new();

    if cors_config.allowed_origins.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<http::HeaderValue> = cors_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    cors = cors.allow_methods(methods);

    if cors_config.allowed_headers.contains(&"*".to_string()) {
        cors = cors.allow_headers(Any);
    }

    cors.max_age(std::time::Duration::from_secs(cors_config.max_age_seconds))
}
