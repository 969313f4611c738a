use geojson::FeatureCollection;
use std::collections::HashMap;
use tracing::debug;

use crate::db::load_candidates;
use crate::domain::property::{CandidateFilter, ListingKind};
use crate::errors::ServerError;
use crate::geo::feature::{feature_collection, DistanceKey};
use crate::geo::{filter, LatLng, QueryRegion};
use crate::state::AppState;

/// Axis-aligned box given by its northeast and southwest corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsParams {
    pub ne_lat: f64,
    pub ne_lng: f64,
    pub sw_lat: f64,
    pub sw_lng: f64,
}

/// Query parameters of `GET /rentals-nearby`.
///
/// Either full `bounds` or `lat`+`lon` must be present; bounds win when both
/// are. `None` fields take their defaults at execution time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NearbyParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_m: Option<f64>,
    pub bounds: Option<BoundsParams>,
    pub price_max: Option<f64>,
    /// Category filter; `"all"` or `None` means every category.
    pub property_type: Option<String>,
    pub listing_type: Option<ListingKind>,
}

impl NearbyParams {
    pub fn circle(lat: f64, lon: f64, radius_m: f64) -> Self {
        Self {
            lat: Some(lat),
            lon: Some(lon),
            radius_m: Some(radius_m),
            ..Self::default()
        }
    }

    pub fn within(bounds: BoundsParams) -> Self {
        Self {
            bounds: Some(bounds),
            ..Self::default()
        }
    }

    /// Parses the decoded query string. Empty values count as absent.
    pub fn from_query(q: &HashMap<String, String>) -> Result<Self, ServerError> {
        let bounds = match (
            number(q, "neLat")?,
            number(q, "neLng")?,
            number(q, "swLat")?,
            number(q, "swLng")?,
        ) {
            (Some(ne_lat), Some(ne_lng), Some(sw_lat), Some(sw_lng)) => Some(BoundsParams {
                ne_lat,
                ne_lng,
                sw_lat,
                sw_lng,
            }),
            _ => None,
        };

        Ok(Self {
            lat: number(q, "lat")?,
            lon: number(q, "lon")?,
            radius_m: number(q, "radius")?,
            bounds,
            price_max: number(q, "priceMax")?,
            property_type: text(q, "type").map(str::to_string),
            listing_type: text(q, "listingType").map(str::parse::<ListingKind>).transpose()?,
        })
    }

    /// The inverse of `from_query`, for callers building a request URL.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |k: &'static str, v: Option<f64>| {
            if let Some(v) = v {
                pairs.push((k, v.to_string()));
            }
        };
        push("lat", self.lat);
        push("lon", self.lon);
        push("radius", self.radius_m);
        if let Some(b) = self.bounds {
            push("neLat", Some(b.ne_lat));
            push("neLng", Some(b.ne_lng));
            push("swLat", Some(b.sw_lat));
            push("swLng", Some(b.sw_lng));
        }
        push("priceMax", self.price_max);
        if let Some(t) = &self.property_type {
            pairs.push(("type", t.clone()));
        }
        if let Some(kind) = self.listing_type {
            pairs.push(("listingType", kind.as_str().to_string()));
        }
        pairs
    }

    pub fn region(&self, default_radius_m: f64) -> Result<QueryRegion, ServerError> {
        let center = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(LatLng::new(lat, lon)),
            _ => None,
        };

        match (self.bounds, center) {
            (Some(b), center) => QueryRegion::bounds(
                LatLng::new(b.ne_lat, b.ne_lng),
                LatLng::new(b.sw_lat, b.sw_lng),
                center,
            ),
            (None, Some(center)) => {
                QueryRegion::circle(center, self.radius_m.unwrap_or(default_radius_m))
            }
            (None, None) => Err(ServerError::BadRequest(
                "Missing location: provide lat and lon (with optional radius) or all of neLat, neLng, swLat, swLng".into(),
            )),
        }
    }

    pub fn candidate_filter(&self) -> CandidateFilter {
        CandidateFilter {
            listing_kind: Some(self.listing_type.unwrap_or_default()),
            categories: CandidateFilter::categories_from(self.property_type.clone()),
            price_max: CandidateFilter::price_ceiling(self.price_max),
        }
    }
}

/// Runs a nearby query: validate, read candidates, filter, shape as GeoJSON.
///
/// Validation happens before the store is touched.
pub fn execute(state: &AppState, params: &NearbyParams) -> Result<FeatureCollection, ServerError> {
    let region = params.region(state.query.default_radius_m)?;
    let candidates = load_candidates(&state.db, &params.candidate_filter(), state.read_timeout)?;
    let total = candidates.len();

    let outcome = filter(candidates, &region, state.query.nearby_cap);
    debug!(
        candidates = total,
        matched = outcome.matches.len(),
        skipped_ungeocoded = outcome.skipped_ungeocoded,
        "nearby query"
    );

    Ok(feature_collection(outcome, DistanceKey::Nearby))
}

fn text<'a>(q: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    q.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn number(q: &HashMap<String, String>, key: &str) -> Result<Option<f64>, ServerError> {
    let Some(raw) = text(q, key) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(ServerError::BadRequest(format!("{key} must be a number, got '{raw}'"))),
    }
}
