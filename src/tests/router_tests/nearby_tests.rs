// src/tests/router_tests/nearby_tests.rs

use crate::domain::property::{ListingKind, Property};
use crate::router::handle;
use crate::tests::utils::*;

fn medellin() -> Vec<Property> {
    vec![
        listing("far", 6.30, -75.60, 1_000_000.0),
        listing("near", 6.25, -75.56, 1_000_000.0),
        listing("here", 6.2476, -75.5658, 1_000_000.0),
    ]
}

#[test]
fn circle_query_keeps_close_listings_in_distance_order() {
    let (_dir, state) = init_test_state();
    seed(&state, &medellin());

    let resp = handle(get("/rentals-nearby?lat=6.2476&lon=-75.5658&radius=2000"), &state).unwrap();
    assert_eq!(resp.status(), 200);
    let body = body_json(resp);

    assert_eq!(body["type"], "FeatureCollection");
    assert_eq!(feature_ids(&body), vec!["here", "near"]);

    let first = &body["features"][0];
    assert_eq!(first["properties"]["distance_km"], 0.0);
    assert_eq!(first["geometry"]["coordinates"][0], -75.5658);
    assert_eq!(first["geometry"]["coordinates"][1], 6.2476);
    assert_eq!(first["properties"]["images"][0], "here.jpg");

    let second = body["features"][1]["properties"]["distance_km"].as_f64().unwrap();
    assert!(second > 0.5 && second < 0.8, "got {second}");
}

#[test]
fn default_radius_is_300_meters() {
    let (_dir, state) = init_test_state();
    seed(&state, &medellin());

    let body = body_json(handle(get("/rentals-nearby?lat=6.2476&lon=-75.5658"), &state).unwrap());
    assert_eq!(feature_ids(&body), vec!["here"]);
}

#[test]
fn growing_radius_never_drops_a_listing() {
    let (_dir, state) = init_test_state();
    seed(&state, &medellin());

    let mut previous: Vec<String> = Vec::new();
    for radius in [100, 800, 2_000, 8_000] {
        let uri = format!("/rentals-nearby?lat=6.2476&lon=-75.5658&radius={radius}");
        let ids = feature_ids(&body_json(handle(get(&uri), &state).unwrap()));
        assert!(previous.iter().all(|id| ids.contains(id)), "radius {radius}: {ids:?}");
        previous = ids;
    }
    assert_eq!(previous.len(), 3);
}

#[test]
fn price_ceiling_applies_regardless_of_proximity() {
    let (_dir, state) = init_test_state();
    seed(
        &state,
        &[
            listing("cheap", 6.2476, -75.5658, 1_000_000.0),
            listing("pricey", 6.2476, -75.5658, 3_000_000.0),
        ],
    );

    let body = body_json(
        handle(get("/rentals-nearby?lat=6.2476&lon=-75.5658&priceMax=2000000"), &state).unwrap(),
    );
    assert_eq!(feature_ids(&body), vec!["cheap"]);

    // Zero means no ceiling.
    let body = body_json(handle(get("/rentals-nearby?lat=6.2476&lon=-75.5658&priceMax=0"), &state).unwrap());
    assert_eq!(feature_ids(&body).len(), 2);
}

#[test]
fn empty_region_returns_empty_collection() {
    let (_dir, state) = init_test_state();
    seed(&state, &medellin());

    let resp = handle(get("/rentals-nearby?lat=4.711&lon=-74.0721&radius=2000"), &state).unwrap();
    assert_eq!(resp.status(), 200);
    let body = body_json(resp);
    assert_eq!(body["features"], serde_json::json!([]));
}

#[test]
fn bounds_include_by_rectangle() {
    let (_dir, state) = init_test_state();
    seed(
        &state,
        &[
            listing("inside", 6.25, -75.56, 1.0),
            listing("edge", 6.26, -75.57, 1.0),
            listing("north", 6.27, -75.56, 1.0),
            listing("west", 6.25, -75.58, 1.0),
        ],
    );

    // A tiny radius must not matter once bounds are present.
    let uri = "/rentals-nearby?neLat=6.26&neLng=-75.55&swLat=6.24&swLng=-75.57&lat=6.25&lon=-75.56&radius=1";
    let body = body_json(handle(get(uri), &state).unwrap());
    assert_eq!(feature_ids(&body), vec!["inside", "edge"]);
}

#[test]
fn listing_kind_and_category_filters() {
    let (_dir, state) = init_test_state();
    let mut sale = listing("sale", 6.2476, -75.5658, 1.0);
    sale.listing_type = ListingKind::Sale;
    let mut house = listing("house", 6.2476, -75.5658, 1.0);
    house.property_type = "house".into();
    seed(&state, &[listing("flat", 6.2476, -75.5658, 1.0), sale, house]);

    let base = "/rentals-nearby?lat=6.2476&lon=-75.5658";
    let mut ids = feature_ids(&body_json(handle(get(base), &state).unwrap()));
    ids.sort();
    assert_eq!(ids, vec!["flat", "house"]);

    let ids = feature_ids(&body_json(handle(get(&format!("{base}&listingType=sale")), &state).unwrap()));
    assert_eq!(ids, vec!["sale"]);

    let ids = feature_ids(&body_json(handle(get(&format!("{base}&type=house")), &state).unwrap()));
    assert_eq!(ids, vec!["house"]);

    let ids = feature_ids(&body_json(handle(get(&format!("{base}&type=all")), &state).unwrap()));
    assert_eq!(ids.len(), 2);
}

#[test]
fn unavailable_and_ungeocoded_listings_are_left_out() {
    let (_dir, state) = init_test_state();
    let mut nowhere = listing("nowhere", 0.0, 0.0, 1.0);
    nowhere.latitude = None;
    nowhere.longitude = None;
    seed(&state, &[listing("here", 6.2476, -75.5658, 1.0), nowhere]);
    seed_with_status(&state, &listing("rented", 6.2476, -75.5658, 1.0), "rented");

    let body = body_json(handle(get("/rentals-nearby?lat=6.2476&lon=-75.5658"), &state).unwrap());
    assert_eq!(feature_ids(&body), vec!["here"]);
    assert_eq!(body["skipped_ungeocoded"], 1);
}

#[test]
fn results_are_capped_at_200() {
    let (_dir, state) = init_test_state();
    let many: Vec<Property> = (0..250)
        .map(|i| listing(&format!("p{i:03}"), 6.2476 + f64::from(i) * 0.00001, -75.5658, 1.0))
        .collect();
    seed(&state, &many);

    let body = body_json(handle(get("/rentals-nearby?lat=6.2476&lon=-75.5658&radius=5000"), &state).unwrap());
    let features = body["features"].as_array().unwrap();
    assert_eq!(features.len(), 200);

    let distances: Vec<f64> = features
        .iter()
        .map(|f| f["properties"]["distance_km"].as_f64().unwrap())
        .collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(feature_ids(&body)[0], "p000");
}

#[test]
fn missing_location_is_a_bad_request() {
    let (_dir, state) = init_test_state();

    let err = expect_err(handle(get("/rentals-nearby?radius=500&neLat=1"), &state));
    assert_eq!(err.status_code(), 400);
    assert!(err.to_string().contains("lat and lon"), "{err}");

    let err = expect_err(handle(get("/rentals-nearby?lat=abc&lon=1"), &state));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn inverted_bounds_are_a_bad_request() {
    let (_dir, state) = init_test_state();
    seed(&state, &[listing("inside", 6.25, -75.56, 1.0)]);

    // Corners swapped: ne is south-west of sw.
    let err = expect_err(handle(
        get("/rentals-nearby?neLat=6.24&neLng=-75.57&swLat=6.26&swLng=-75.55"),
        &state,
    ));
    assert_eq!(err.status_code(), 400);
    assert!(err.to_string().contains("neLat"), "{err}");

    // Latitudes fine, longitudes swapped.
    let err = expect_err(handle(
        get("/rentals-nearby?neLat=6.26&neLng=-75.57&swLat=6.24&swLng=-75.55"),
        &state,
    ));
    assert_eq!(err.status_code(), 400);
    assert!(err.to_string().contains("neLng"), "{err}");
}
