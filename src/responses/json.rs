use astra::{Body, ResponseBuilder};
use serde::Serialize;

use crate::errors::ServerError;
use crate::responses::{with_cors, ResultResp};

/// Serialize `value` as a JSON response with CORS headers.
pub fn json_response<T: Serialize>(status: u16, value: &T) -> ResultResp {
    let body = serde_json::to_vec(value).map_err(|_| ServerError::InternalError)?;

    let resp = ResponseBuilder::new()
        .status(status)
        .header("Content-Type", mime::APPLICATION_JSON.as_ref())
        .body(Body::from(body))
        .map_err(|_| ServerError::InternalError)?;

    Ok(with_cors(resp))
}
