//! Food listing entity: model, category/unit enums, and status.

pub mod category;
pub mod model;
pub mod status;

pub use category::{ListingCategory, ListingUnit};
pub use model::{CreateListing, FoodListing, UpdateListing};
pub use status::ListingStatus;
