use geojson::FeatureCollection;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::client::ClientError;
use crate::router::NEARBY_PATH;
use crate::service::{nearby, NearbyParams};
use crate::state::AppState;

/// Something that can answer a nearby query.
pub trait NearbySource {
    fn fetch(&self, params: &NearbyParams) -> Result<FeatureCollection, ClientError>;
}

/// Runs the query in-process against the store.
impl NearbySource for AppState {
    fn fetch(&self, params: &NearbyParams) -> Result<FeatureCollection, ClientError> {
        Ok(nearby::execute(self, params)?)
    }
}

/// Calls `GET /rentals-nearby` on a running server.
pub struct HttpNearbySource {
    client: Client,
    endpoint: Url,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpNearbySource {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// `base_url` is the server root, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let endpoint = Url::parse(base_url)?.join(NEARBY_PATH)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn request_url(&self, params: &NearbyParams) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(params.to_query_pairs());
        url
    }
}

impl NearbySource for HttpNearbySource {
    fn fetch(&self, params: &NearbyParams) -> Result<FeatureCollection, ClientError> {
        let response = self.client.get(self.request_url(params)).send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or(text);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
    }
}
