//! Booking handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Serialize;
use uuid::Uuid;

use saveserve_core::types::pagination::PageResponse;
use saveserve_entity::booking::{Booking, BookingStatus};
use saveserve_entity::listing::FoodListing;

use crate::dto::request::{
    self, CreateBookingRequest, RateBookingRequest, UpdateBookingStatusRequest,
    VerifyCollectionRequest,
};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// Body of a successful collection verification.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionResponse {
    /// The collected booking.
    pub booking: Booking,
    /// The completed listing.
    pub listing: FoodListing,
}

/// POST /api/bookings
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<Booking>>, ApiError> {
    request::validate(&req)?;

    let booking = state
        .booking_service
        .create(&auth, req.listing_id, req.quantity)
        .await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// GET /api/bookings/mine
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<Booking>>>, ApiError> {
    let page = state
        .booking_service
        .list_mine(&auth, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/bookings/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Booking>>, ApiError> {
    let booking = state.booking_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// PATCH /api/bookings/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBookingStatusRequest>,
) -> Result<Json<ApiResponse<Booking>>, ApiError> {
    let status: BookingStatus = req.status.parse()?;

    let booking = state
        .booking_service
        .update_status(&auth, id, status, req.provider_response)
        .await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// PATCH /api/bookings/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Booking>>, ApiError> {
    let booking = state.booking_service.cancel(&auth, id).await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// PATCH /api/bookings/{id}/rate
pub async fn rate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RateBookingRequest>,
) -> Result<Json<ApiResponse<Booking>>, ApiError> {
    request::validate(&req)?;

    let booking = state
        .booking_service
        .rate(&auth, id, req.rating, req.feedback)
        .await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// POST /api/bookings/verify-collection
pub async fn verify_collection(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<VerifyCollectionRequest>,
) -> Result<Json<ApiResponse<CollectionResponse>>, ApiError> {
    let outcome = state
        .collection_service
        .verify(
            &auth,
            req.listing_id,
            req.qr_data.as_deref(),
            req.collection_code.as_deref(),
        )
        .await?;

    Ok(Json(ApiResponse::ok(CollectionResponse {
        booking: outcome.booking,
        listing: outcome.listing,
    })))
}
