//! Listing handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use saveserve_core::types::pagination::PageResponse;
use saveserve_entity::listing::model::{CreateListing, FoodListing, UpdateListing};
use saveserve_service::booking::service::BookingView;

use crate::dto::request::{self, CreateListingRequest, UpdateListingRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/listings
pub async fn browse(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<FoodListing>>>, ApiError> {
    let page = state
        .listing_service
        .browse(&auth, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/listings
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateListingRequest>,
) -> Result<Json<ApiResponse<FoodListing>>, ApiError> {
    request::validate(&req)?;

    let listing = state
        .listing_service
        .create(
            &auth,
            CreateListing {
                title: req.title,
                description: req.description,
                category: req.category,
                quantity: req.quantity,
                unit: req.unit,
                available_from: req.available_from,
                available_until: req.available_until,
                location: req.location,
                latitude: req.latitude,
                longitude: req.longitude,
                image_url: req.image_url,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(listing)))
}

/// GET /api/listings/mine
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<FoodListing>>>, ApiError> {
    let page = state
        .listing_service
        .list_mine(&auth, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/listings/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FoodListing>>, ApiError> {
    let listing = state.listing_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(listing)))
}

/// PATCH /api/listings/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateListingRequest>,
) -> Result<Json<ApiResponse<FoodListing>>, ApiError> {
    request::validate(&req)?;

    let listing = state
        .listing_service
        .update(
            &auth,
            id,
            UpdateListing {
                title: req.title,
                description: req.description,
                quantity: req.quantity,
                available_until: req.available_until,
                location: req.location,
                image_url: req.image_url,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(listing)))
}

/// DELETE /api/listings/{id}
pub async fn deactivate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FoodListing>>, ApiError> {
    let listing = state.listing_service.deactivate(&auth, id).await?;
    Ok(Json(ApiResponse::ok(listing)))
}

/// GET /api/listings/{id}/bookings
pub async fn bookings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<BookingView>>>, ApiError> {
    let views = state.booking_service.list_for_listing(&auth, id).await?;
    Ok(Json(ApiResponse::ok(views)))
}
