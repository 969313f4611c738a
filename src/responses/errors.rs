use astra::{Body, Response, ResponseBuilder};
use serde_json::json;
use tracing::error;

use crate::errors::ServerError;
use crate::responses::{json_response, with_cors};

/// Convert a ServerError into a `{ "error": "..." }` JSON response.
pub fn error_to_response(err: ServerError) -> Response {
    let status = err.status_code();
    if status >= 500 {
        error!(status, error = %err, "request failed");
    }

    json_response(status, &json!({ "error": err.to_string() })).unwrap_or_else(|_| {
        let resp = ResponseBuilder::new()
            .status(500)
            .body(Body::from("Internal Server Error"))
            .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")));
        with_cors(resp)
    })
}
