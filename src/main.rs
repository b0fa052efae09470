// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use axum::{Router, routing::get};
use std::{net::SocketAddr, sync::Arc};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::series_service::SeriesService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::jma_repository::JmaRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{health_check, nowcast_series, sample_point, version};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(JmaRepository::new(
        config.endpoints.catalog_url.clone(),
        config.fetch.request_timeout(),
    )?);

    // Create services (application layer)
    let series_service = SeriesService::new(
        repository,
        config.endpoints.clone(),
        config.fetch.max_concurrent_fetches,
        config.fetch.series_deadline(),
    );

    // Create application state
    let state = Arc::new(AppState {
        series_service,
        defaults: config.defaults.clone(),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/", get(sample_point))
        .route("/nowcast", get(nowcast_series))
        .route("/version", get(version))
        .route("/healthz", get(health_check))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Starting nowcast-pixel service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
