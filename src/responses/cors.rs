// responses/cors.rs
use astra::{Body, Response, ResponseBuilder};
use http::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};

use crate::errors::ServerError;
use crate::responses::ResultResp;

const ALLOW_ORIGIN: &str = "*";
const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
const ALLOW_METHODS: &str = "GET, POST, OPTIONS";

/// Adds the allow-all CORS headers. Every response goes through here.
pub fn with_cors(mut resp: Response) -> Response {
    let headers = resp.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ALLOW_ORIGIN));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    resp
}

/// Empty 200 answer to an `OPTIONS` preflight.
pub fn preflight_response() -> ResultResp {
    let resp = ResponseBuilder::new()
        .status(200)
        .body(Body::empty())
        .map_err(|_| ServerError::InternalError)?;
    Ok(with_cors(resp))
}
