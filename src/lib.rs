//! Nearby and route-corridor listing queries over a SQLite listing store,
//! served as GeoJSON over HTTP, plus a caller-side region cache.

pub mod client;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod geo;
pub mod responses;
pub mod router;
pub mod service;
pub mod state;

#[cfg(test)]
mod tests;

pub use config::AppConfig;
pub use errors::ServerError;
pub use state::AppState;
