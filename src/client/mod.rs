//! Caller-side access to the nearby query: a short-lived region cache in
//! front of any [`NearbySource`].

pub mod cache;
pub mod source;

use thiserror::Error;

use crate::errors::ServerError;

pub use cache::{cache_key, CacheConfig, NearbyCache};
pub use source::{HttpNearbySource, NearbySource};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("undecodable response: {0}")]
    Decode(String),

    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// The in-process service rejected the query.
    #[error(transparent)]
    Service(#[from] ServerError),
}
