// src/domain/property.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ServerError;
use crate::geo::{LatLng, Located};

/// Only listings in this status are visible to queries.
pub const STATUS_AVAILABLE: &str = "available";

/// Whether a listing is offered for rent or for sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    #[default]
    Rent,
    Sale,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Rent => "rent",
            ListingKind::Sale => "sale",
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingKind {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rent" => Ok(ListingKind::Rent),
            "sale" => Ok(ListingKind::Sale),
            other => Err(ServerError::BadRequest(format!(
                "listingType must be 'rent' or 'sale', got '{other}'"
            ))),
        }
    }
}

/// A listing as read from the store. Display fields are passed through to
/// the response untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub address: Option<String>,
    pub price: f64,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub area: Option<f64>,
    pub property_type: String,
    pub listing_type: ListingKind,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub images: Vec<String>,
}

impl Located for Property {
    fn coords(&self) -> Option<LatLng> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(LatLng::new(lat, lng)),
            _ => None,
        }
    }
}

/// Store-side filters applied before any spatial work.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateFilter {
    /// `None` matches both kinds.
    pub listing_kind: Option<ListingKind>,
    /// Empty means every category.
    pub categories: Vec<String>,
    /// `None` means no ceiling.
    pub price_max: Option<f64>,
}

impl CandidateFilter {
    /// A ceiling of zero or less means "no cap".
    pub fn price_ceiling(price_max: Option<f64>) -> Option<f64> {
        price_max.filter(|p| *p > 0.0)
    }

    /// `"all"` anywhere in the list disables category filtering.
    pub fn categories_from<I, S>(types: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let types: Vec<String> = types
            .into_iter()
            .map(Into::into)
            .filter(|t| !t.trim().is_empty())
            .collect();
        if types.iter().any(|t| t == "all") {
            Vec::new()
        } else {
            types
        }
    }
}
