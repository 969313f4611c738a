use crate::config::AppConfig;
use crate::errors::{ResultResp, ServerError};
use crate::db::{init_db, upsert_property, Database};
use crate::domain::property::{ListingKind, Property};
use crate::state::AppState;
use astra::{Body, Request, Response};
use http::Method;
use serde_json::Value;
use std::io::Read;
use tempfile::TempDir;

/// Fresh store with the production schema. Keep the `TempDir` alive for the
/// duration of the test.
pub fn init_test_state() -> (TempDir, AppState) {
    let dir = TempDir::new().expect("create temp dir");
    let db = Database::new(dir.path().join("rentals.sqlite3").to_string_lossy().into_owned());
    init_db(&db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    let state = AppState::new(db, &AppConfig::default());
    (dir, state)
}

/// A rent listing of type `apartment` at the given position.
pub fn listing(id: &str, lat: f64, lng: f64, price: f64) -> Property {
    Property {
        id: id.to_string(),
        title: format!("Listing {id}"),
        address: None,
        price,
        bedrooms: Some(2),
        bathrooms: Some(1),
        area: Some(60.0),
        property_type: "apartment".to_string(),
        listing_type: ListingKind::Rent,
        latitude: Some(lat),
        longitude: Some(lng),
        images: vec![format!("{id}.jpg")],
    }
}

pub fn seed(state: &AppState, listings: &[Property]) {
    state
        .db
        .with_conn(|conn| {
            let tx = conn.transaction()?;
            for p in listings {
                upsert_property(&tx, p, "available")?;
            }
            tx.commit()?;
            Ok(())
        })
        .expect("seed listings");
}

pub fn request(method: Method, uri: &str, body: Body) -> Request {
    let mut req = Request::new(body);
    *req.method_mut() = method;
    *req.uri_mut() = uri.parse().expect("valid uri");
    req
}

pub fn get(uri: &str) -> Request {
    request(Method::GET, uri, Body::empty())
}

pub fn post_json(uri: &str, body: &Value) -> Request {
    request(Method::POST, uri, Body::from(body.to_string()))
}

pub fn body_json(mut resp: Response) -> Value {
    let mut bytes = Vec::new();
    resp.body_mut()
        .reader()
        .read_to_end(&mut bytes)
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn seed_with_status(state: &AppState, listing: &Property, status: &str) {
    state
        .db
        .with_conn(|conn| upsert_property(conn, listing, status))
        .expect("seed listing");
}

/// Feature ids in response order.
pub fn feature_ids(collection: &Value) -> Vec<String> {
    collection["features"]
        .as_array()
        .expect("features array")
        .iter()
        .map(|f| f["properties"]["id"].as_str().unwrap_or_default().to_string())
        .collect()
}

/// The error of a handler result that is expected to fail.
pub fn expect_err(result: ResultResp) -> ServerError {
    match result {
        Ok(resp) => panic!("expected an error, got status {}", resp.status()),
        Err(e) => e,
    }
}
