use geojson::{FeatureCollection, Geometry};
use serde::Deserialize;
use tracing::debug;

use crate::db::load_candidates;
use crate::domain::property::CandidateFilter;
use crate::errors::ServerError;
use crate::geo::feature::{feature_collection, DistanceKey};
use crate::geo::route::{route_lines, RouteDistance};
use crate::geo::{filter, QueryRegion};
use crate::state::AppState;

/// JSON body of `POST /rentals-route`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteRequest {
    pub route_geojson: Option<RouteFeature>,
    pub buffer_m: Option<f64>,
    #[serde(rename = "priceMax")]
    pub price_max: Option<f64>,
    /// Empty, missing or containing `"all"` means every category.
    pub types: Option<Vec<String>>,
}

/// Only the geometry of the submitted route feature is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteFeature {
    pub geometry: Option<serde_json::Value>,
}

impl RouteRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self, ServerError> {
        serde_json::from_slice(body)
            .map_err(|e| ServerError::BadRequest(format!("invalid JSON body: {e}")))
    }

    pub fn region(&self, default_buffer_m: f64, mode: RouteDistance) -> Result<QueryRegion, ServerError> {
        let geometry = self
            .route_geojson
            .as_ref()
            .and_then(|f| f.geometry.as_ref())
            .filter(|g| !g.is_null())
            .ok_or_else(|| ServerError::BadRequest("route_geojson.geometry is required".into()))?;

        let geometry: Geometry = serde_json::from_value(geometry.clone())
            .map_err(|e| ServerError::BadRequest(format!("invalid route geometry: {e}")))?;

        let lines = route_lines(&geometry)?;
        QueryRegion::corridor(lines, self.buffer_m.unwrap_or(default_buffer_m), mode)
    }

    pub fn candidate_filter(&self) -> CandidateFilter {
        CandidateFilter {
            listing_kind: None,
            categories: CandidateFilter::categories_from(self.types.clone().unwrap_or_default()),
            price_max: CandidateFilter::price_ceiling(self.price_max),
        }
    }
}

/// Runs a route corridor query. The geometry is validated before the store
/// is read.
pub fn execute(state: &AppState, req: &RouteRequest) -> Result<FeatureCollection, ServerError> {
    let region = req.region(state.query.default_buffer_m, state.query.route_distance)?;
    let candidates = load_candidates(&state.db, &req.candidate_filter(), state.read_timeout)?;
    let total = candidates.len();

    let outcome = filter(candidates, &region, state.query.route_cap);
    debug!(
        candidates = total,
        matched = outcome.matches.len(),
        skipped_ungeocoded = outcome.skipped_ungeocoded,
        mode = ?state.query.route_distance,
        "route query"
    );

    Ok(feature_collection(outcome, DistanceKey::Route))
}
