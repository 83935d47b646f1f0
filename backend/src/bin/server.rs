//! Geo Forecast HTTP Server Binary
//!
//! Loads the configuration, sets up the dataset store and the HTTP router, and
//! starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! DATA_PATH=data/kepler_data.json cargo run --bin geo-forecast-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `DATA_PATH`: Artifact location (default: data/kepler_data.json)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use geo_forecast::config::ServerConfig;
use geo_forecast::data::DatasetStore;
use geo_forecast::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Geo Forecast HTTP Server");

    let config = ServerConfig::load().context("Failed to load configuration")?;
    let addr = config.bind_addr()?;

    let store = Arc::new(DatasetStore::new(
        config.data.path.clone(),
        config.dataset_options(),
    ));

    // A missing artifact is not fatal at startup; requests report it until
    // the file appears.
    let preload = Arc::clone(&store);
    match tokio::task::spawn_blocking(move || preload.get()).await? {
        Ok(dataset) => info!(
            "Dataset ready: {} rows, {} buckets",
            dataset.table().len(),
            dataset.time_index().len()
        ),
        Err(e) => warn!("Dataset not loaded: {}", e),
    }

    let app = create_router(AppState::new(store));

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
