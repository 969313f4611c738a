use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

use crate::domain::property::Property;
use crate::geo::filter::FilterOutcome;

/// Name of the computed distance property on each feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceKey {
    /// Circle and bounds queries.
    Nearby,
    /// Route corridor queries.
    Route,
}

impl DistanceKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceKey::Nearby => "distance_km",
            DistanceKey::Route => "distance_to_route_km",
        }
    }
}

/// Foreign member carrying the count of listings left out for lack of
/// coordinates.
pub const SKIPPED_UNGEOCODED: &str = "skipped_ungeocoded";

/// Point geometry is `[lng, lat]`. Features keep the outcome's order.
pub fn feature_collection(outcome: FilterOutcome<Property>, key: DistanceKey) -> FeatureCollection {
    let features = outcome
        .matches
        .into_iter()
        .map(|ranked| {
            let p = ranked.item;
            let mut properties = JsonObject::new();
            properties.insert("id".into(), json!(p.id));
            properties.insert("title".into(), json!(p.title));
            properties.insert("address".into(), json!(p.address));
            properties.insert("price".into(), json!(p.price));
            properties.insert("bedrooms".into(), json!(p.bedrooms));
            properties.insert("bathrooms".into(), json!(p.bathrooms));
            properties.insert("area".into(), json!(p.area));
            properties.insert("property_type".into(), json!(p.property_type));
            properties.insert("listing_type".into(), json!(p.listing_type));
            properties.insert("images".into(), json!(p.images));
            properties.insert(key.as_str().into(), json!(ranked.distance_km));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![
                    ranked.position.lng,
                    ranked.position.lat,
                ]))),
                id: Some(Id::String(p.id)),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let mut foreign = JsonObject::new();
    foreign.insert(SKIPPED_UNGEOCODED.into(), json!(outcome.skipped_ungeocoded));

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign),
    }
}
