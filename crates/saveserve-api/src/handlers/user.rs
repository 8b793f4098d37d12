//! User self-service handlers.

use axum::Json;
use axum::extract::State;

use saveserve_entity::stats::UserStats;
use saveserve_entity::user::UpdateProfile;

use crate::dto::request::{self, UpdateProfileRequest};
use crate::dto::response::{ApiResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users/me
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.user_service.get_profile(&auth).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// PUT /api/users/me
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    request::validate(&req)?;

    let user = state
        .user_service
        .update_profile(
            &auth,
            UpdateProfile {
                email: req.email,
                display_name: req.display_name,
                organization: req.organization,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(user.into())))
}

/// GET /api/users/me/stats
pub async fn get_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserStats>>, ApiError> {
    let stats = state.user_service.get_stats(&auth).await?;
    Ok(Json(ApiResponse::ok(stats)))
}
