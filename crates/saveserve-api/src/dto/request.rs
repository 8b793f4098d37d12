//! Request DTOs.
//!
//! Structural validation (lengths, ranges, formats) lives here via the
//! `validator` derive; semantic validation (state preconditions,
//! authorization) lives in the services.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use saveserve_core::error::AppError;
use saveserve_entity::listing::{ListingCategory, ListingUnit};
use saveserve_entity::user::{RecipientSubrole, UserRole};

/// Run `validator` checks, mapping failures to a 400.
pub fn validate(req: &impl Validate) -> Result<(), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))
}

/// POST /api/auth/register
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username.
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    /// Email address.
    #[validate(email)]
    pub email: String,
    /// Plaintext password; strength-checked by the auth layer.
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// Display name.
    #[validate(length(max = 128))]
    pub display_name: Option<String>,
    /// Account role (`provider` or `recipient`).
    pub role: UserRole,
    /// Recipient subrole; required when role is `recipient`.
    pub subrole: Option<RecipientSubrole>,
    /// Organization name.
    #[validate(length(max = 128))]
    pub organization: Option<String>,
}

/// POST /api/auth/login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// POST /api/auth/refresh
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token issued at login.
    pub refresh_token: String,
}

/// PUT /api/users/me
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New email address.
    #[validate(email)]
    pub email: Option<String>,
    /// New display name.
    #[validate(length(max = 128))]
    pub display_name: Option<String>,
    /// New organization name.
    #[validate(length(max = 128))]
    pub organization: Option<String>,
}

/// POST /api/listings
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateListingRequest {
    /// Short title.
    #[validate(length(min = 3, max = 120))]
    pub title: String,
    /// Longer description.
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// Food category.
    pub category: ListingCategory,
    /// Posted quantity.
    #[validate(range(min = 1))]
    pub quantity: i32,
    /// Measurement unit.
    pub unit: ListingUnit,
    /// Start of the freshness window.
    pub available_from: DateTime<Utc>,
    /// End of the freshness window.
    pub available_until: DateTime<Utc>,
    /// Pickup location.
    #[validate(length(min = 3, max = 256))]
    pub location: String,
    /// Geocoded latitude.
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    /// Geocoded longitude.
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    /// Hosted image URL.
    #[validate(url)]
    pub image_url: Option<String>,
}

/// PATCH /api/listings/{id}
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateListingRequest {
    /// New title.
    #[validate(length(min = 3, max = 120))]
    pub title: Option<String>,
    /// New description.
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// New quantity.
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    /// New end of the freshness window.
    pub available_until: Option<DateTime<Utc>>,
    /// New pickup location.
    #[validate(length(min = 3, max = 256))]
    pub location: Option<String>,
    /// New image URL.
    #[validate(url)]
    pub image_url: Option<String>,
}

/// POST /api/bookings
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    /// The listing to book.
    pub listing_id: Uuid,
    /// Requested quantity.
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// PATCH /api/bookings/{id}/status
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBookingStatusRequest {
    /// Target status: `approved` or `rejected`.
    pub status: String,
    /// Free-text message to the recipient.
    pub provider_response: Option<String>,
}

/// PATCH /api/bookings/{id}/rate
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RateBookingRequest {
    /// Rating, 1 to 5.
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    /// Free-text feedback.
    #[validate(length(max = 2000))]
    pub feedback: Option<String>,
}

/// POST /api/bookings/verify-collection
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyCollectionRequest {
    /// Scanned QR payload, if available.
    pub qr_data: Option<String>,
    /// 6-digit backup code, if the QR cannot be scanned.
    pub collection_code: Option<String>,
    /// The listing being collected from.
    pub listing_id: Uuid,
}
