//! Auth handlers — register, login, refresh, logout, me.

use axum::Json;
use axum::extract::State;

use saveserve_service::user::service::Registration;

use crate::dto::request::{self, LoginRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::{ApiResponse, LoginResponse, MessageResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    request::validate(&req)?;

    let user = state
        .user_service
        .register(Registration {
            username: req.username,
            email: req.email,
            password: req.password,
            display_name: req.display_name,
            role: req.role,
            subrole: req.subrole,
            organization: req.organization,
        })
        .await?;

    Ok(Json(ApiResponse::ok(user.into())))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let result = state
        .session_manager
        .login(&req.username, &req.password, None, None)
        .await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        access_token: result.tokens.access_token,
        refresh_token: result.tokens.refresh_token,
        access_expires_at: result.tokens.access_expires_at,
        refresh_expires_at: result.tokens.refresh_expires_at,
        user: result.user.into(),
    })))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let result = state.session_manager.refresh(&req.refresh_token).await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        access_token: result.tokens.access_token,
        refresh_token: result.tokens.refresh_token,
        access_expires_at: result.tokens.access_expires_at,
        refresh_expires_at: result.tokens.refresh_expires_at,
        user: result.user.into(),
    })))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.session_manager.logout(auth.session_id).await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Logged out successfully".to_string(),
    })))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.user_service.get_profile(&auth).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}
