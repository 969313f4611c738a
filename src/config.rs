//! Layered configuration.
//!
//! Uses Figment to merge built-in defaults, an optional `rentals.toml` and
//! `RENTALS_*` environment variables (nested keys split on `__`, e.g.
//! `RENTALS_DATABASE__PATH`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::geo::route::RouteDistance;

pub const DEFAULT_CONFIG_FILE: &str = "rentals.toml";
pub const ENV_PREFIX: &str = "RENTALS_";

/// Longest accepted store read deadline.
pub const MAX_READ_TIMEOUT_MS: u64 = 10 * 60 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub query: QueryConfig,
    pub log_filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub max_workers: usize,
    /// Upper bound on request bodies (route geometries).
    pub max_body_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    /// Deadline for a single candidate read.
    pub read_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub nearby_cap: usize,
    pub route_cap: usize,
    pub default_radius_m: f64,
    pub default_buffer_m: f64,
    pub route_distance: RouteDistance,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            max_workers: 8,
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "rentals.sqlite3".to_string(),
            read_timeout_ms: 10_000,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            nearby_cap: 200,
            route_cap: 30,
            default_radius_m: 300.0,
            default_buffer_m: 150.0,
            route_distance: RouteDistance::Vertices,
        }
    }
}

impl DatabaseConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl AppConfig {
    /// Defaults, then `rentals.toml` (if present), then `RENTALS_*` env vars.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.server.max_workers == 0 {
            anyhow::bail!("server.max_workers must be at least 1");
        }
        if self.query.nearby_cap == 0 || self.query.route_cap == 0 {
            anyhow::bail!("query caps must be at least 1");
        }
        if !(self.query.default_radius_m > 0.0) || !(self.query.default_buffer_m > 0.0) {
            anyhow::bail!("default radius and buffer must be positive");
        }
        if self.database.read_timeout_ms == 0 || self.database.read_timeout_ms > MAX_READ_TIMEOUT_MS {
            anyhow::bail!(
                "database.read_timeout_ms must be between 1 and {MAX_READ_TIMEOUT_MS}, got {}",
                self.database.read_timeout_ms
            );
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            query: QueryConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}
