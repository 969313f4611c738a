use astra::Request;
use serde_json::json;
use std::collections::HashMap;
use std::io::Read;
use std::time::Instant;
use tracing::info;

use crate::errors::ServerError;
use crate::responses::{error_to_response, json_response, preflight_response, ResultResp};
use crate::service::{nearby, route, NearbyParams, RouteRequest};
use crate::state::AppState;

pub const NEARBY_PATH: &str = "/rentals-nearby";
pub const ROUTE_PATH: &str = "/rentals-route";

pub fn handle(mut req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();

    match (method.as_str(), path.as_str()) {
        ("OPTIONS", _) => preflight_response(),
        ("GET", "/health") => json_response(200, &json!({ "status": "ok" })),

        ("GET", NEARBY_PATH) => {
            let params = NearbyParams::from_query(&parse_query(&req))?;
            let collection = nearby::execute(state, &params)?;
            json_response(200, &collection)
        }

        ("POST", ROUTE_PATH) => {
            let body = read_body(&mut req, state.max_body_bytes)?;
            let request = RouteRequest::from_slice(&body)?;
            let collection = route::execute(state, &request)?;
            json_response(200, &collection)
        }

        (_, NEARBY_PATH) | (_, ROUTE_PATH) => Err(ServerError::MethodNotAllowed),
        _ => Err(ServerError::NotFound),
    }
}

/// Entry point used by the server: never fails, logs every request.
pub fn serve(req: Request, state: &AppState) -> astra::Response {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let resp = handle(req, state).unwrap_or_else(error_to_response);

    info!(
        %method,
        %path,
        status = resp.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    resp
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn read_body(req: &mut Request, limit: u64) -> Result<Vec<u8>, ServerError> {
    let mut body = Vec::new();
    req.body_mut()
        .reader()
        .take(limit + 1)
        .read_to_end(&mut body)
        .map_err(|e| ServerError::BadRequest(format!("failed to read body: {e}")))?;

    if body.len() as u64 > limit {
        return Err(ServerError::BadRequest(format!(
            "request body exceeds {limit} bytes"
        )));
    }
    Ok(body)
}
