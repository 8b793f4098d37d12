//! Health check handlers.

use axum::Json;
use axum::extract::State;

use saveserve_database::connection;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/health
pub async fn health_check() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// GET /api/health/detailed
pub async fn detailed_health(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DetailedHealthResponse>>, ApiError> {
    let database = match connection::health_check(&state.db_pool).await {
        Ok(true) => "ok",
        _ => "unreachable",
    };

    Ok(Json(ApiResponse::ok(DetailedHealthResponse {
        status: if database == "ok" { "ok" } else { "degraded" }.to_string(),
        database: database.to_string(),
        ws_connections: state.hub.connection_count(),
        online_users: state.hub.online_user_count(),
    })))
}
