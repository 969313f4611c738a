use std::time::Duration;

use crate::config::{AppConfig, QueryConfig};
use crate::db::Database;

/// Everything a request handler needs. Cloned into each server worker.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: Database,
    pub query: QueryConfig,
    pub read_timeout: Duration,
    pub max_body_bytes: u64,
}

impl AppState {
    pub fn new(db: Database, config: &AppConfig) -> Self {
        Self {
            db,
            query: config.query.clone(),
            read_timeout: config.database.read_timeout(),
            max_body_bytes: config.server.max_body_bytes,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let db = Database::new(config.database.path.clone())
            .with_busy_timeout(config.database.read_timeout());
        Self::new(db, config)
    }
}
