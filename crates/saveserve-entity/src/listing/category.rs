//! Listing category and measurement unit enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad food category of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ListingCategory {
    /// Prepared meals (canteen trays, event catering).
    CookedMeal,
    /// Bread and pastry.
    Bakery,
    /// Fruit and vegetables.
    Produce,
    /// Sealed packaged goods.
    Packaged,
    /// Drinks.
    Beverage,
    /// Anything else.
    Other,
}

impl ListingCategory {
    /// Return the category as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CookedMeal => "cooked_meal",
            Self::Bakery => "bakery",
            Self::Produce => "produce",
            Self::Packaged => "packaged",
            Self::Beverage => "beverage",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ListingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unit the listing quantity is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_unit", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingUnit {
    /// Individual servings/portions.
    Servings,
    /// Kilograms.
    Kg,
    /// Discrete items.
    Items,
    /// Liters.
    Liters,
}

impl ListingUnit {
    /// Return the unit as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Servings => "servings",
            Self::Kg => "kg",
            Self::Items => "items",
            Self::Liters => "liters",
        }
    }
}

impl fmt::Display for ListingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
