//! Inventory API - product CRUD over REST

use axum_helpers::server::create_production_app;
use core_config::load_dotenv;
use core_config::tracing::{init_tracing, install_color_eyre};
use database::common::RetryConfig;
use database::postgres::connect_from_config_with_retry;
use std::time::Duration;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

/// Upper bound for draining requests and for closing the pool
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let dotenv = load_dotenv()?;
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    if let Some(path) = dotenv {
        info!("Loaded configuration from {}", path.display());
    }

    let state = match &config.postgres {
        Some(postgres) => {
            info!("Connecting to PostgreSQL at {}", postgres.redacted_url());
            let db = connect_from_config_with_retry(postgres.clone(), RetryConfig::default()).await?;
            AppState { db: Some(db) }
        }
        None => {
            info!("Using in-memory product storage");
            AppState::default()
        }
    };

    let app = api::app(&state, config.app, &config.server)?;

    info!(
        "Starting {} v{} ({} storage) on {}",
        config.app.name,
        config.app.version,
        config.storage,
        config.server.address()
    );

    let db = state.db;
    create_production_app(app, &config.server, SHUTDOWN_TIMEOUT, async move {
        if let Some(db) = db {
            info!("Shutting down: closing PostgreSQL pool");
            match db.close().await {
                Ok(()) => info!("PostgreSQL pool closed"),
                Err(e) => warn!("Failed to close PostgreSQL pool: {}", e),
            }
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Inventory API shutdown complete");
    Ok(())
}
