// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::sensor_service::SensorService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::postgres_repository::PostgresRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::presenter::Presenter;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_app_config()?;

    // Initialize tracing; RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let catalog = config.catalog()?;
    let local = config.civil_offset()?;
    tracing::info!(
        series = ?catalog.names().collect::<Vec<_>>(),
        "Loaded series catalog"
    );

    // Create repository (infrastructure layer); connects in the background
    let repository = Arc::new(PostgresRepository::new(config.database.clone())?);
    repository.spawn_connector();

    // Create services (application layer)
    let sensor_service = SensorService::new(
        repository,
        catalog,
        config.sampling_options()?,
        config.ingest_band()?,
        config.sampling.default_interval_minutes,
        local,
    );

    // Create application state
    let state = Arc::new(AppState {
        sensor_service,
        presenter: Presenter::new(local, config.presentation.timezone_label.clone()),
    });

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Starting thermo-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
