//! Admin-only handlers.

use axum::Json;
use axum::extract::State;

use saveserve_entity::listing::FoodListing;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/admin/listings/ngo-consistency
///
/// Reports listings whose NGO-exclusivity flag disagrees with the bulk
/// threshold predicate. The write paths enforce the invariant, so this
/// should always return an empty list; anything else is a bug report.
pub async fn ngo_consistency(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<FoodListing>>>, ApiError> {
    let violations = state.listing_service.ngo_consistency(&auth).await?;
    Ok(Json(ApiResponse::ok(violations)))
}
