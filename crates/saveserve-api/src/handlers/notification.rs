//! Notification handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use saveserve_core::types::pagination::PageResponse;
use saveserve_entity::notification::Notification;

use crate::dto::response::{ApiResponse, CountResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/notifications
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<Notification>>>, ApiError> {
    let page = state
        .notification_service
        .list(&auth, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.notification_service.unread_count(&auth).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.notification_service.mark_read(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Marked as read".to_string(),
    })))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let marked = state.notification_service.mark_all_read(&auth).await?;
    Ok(Json(ApiResponse::ok(CountResponse {
        count: marked as i64,
    })))
}

/// DELETE /api/notifications/{id}
pub async fn dismiss(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.notification_service.dismiss(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Dismissed".to_string(),
    })))
}
