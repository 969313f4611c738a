use astra::Server;
use rentals_geo::db::init_db;
use rentals_geo::router::serve;
use rentals_geo::{AppConfig, AppState};
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    // Build the shared state and make sure the schema exists.
    let state = AppState::from_config(&config);
    init_db(&state.db)?;

    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind_addr '{}': {}", config.server.bind_addr, e))?;
    info!(%addr, workers = config.server.max_workers, "starting server");

    let server = Server::bind(&addr).max_workers(config.server.max_workers);

    // Serve requests, passing the state into the closure.
    let result = server.serve(move |req, _info| serve(req, &state));

    if let Err(e) = result {
        error!(error = %e, "server ended with error");
        return Err(e.into());
    }

    info!("server shut down cleanly");
    Ok(())
}
