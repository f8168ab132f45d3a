//! HTTP server for the Fete event site.

pub mod gate;
pub mod routes;

pub use gate::{AccessGate, GateOutcome};
pub use routes::{routes, AppState, ErrorResponse, HealthResponse, WeatherResponse};

use fete_core::{AppError, Config};
use fete_weather::WeatherService;
use std::net::SocketAddr;
use std::sync::Arc;

impl AppState {
    pub fn new(weather: WeatherService, config: &Config) -> Self {
        Self {
            weather: Arc::new(weather),
            gate: Arc::new(AccessGate::from_config(&config.gate)),
            static_dir: config.static_dir.clone(),
        }
    }
}

/// Run the server until Ctrl-C.
pub async fn serve(config: Config) -> Result<(), AppError> {
    let service = WeatherService::from_config(&config)?;
    let current_source = service.current_source();
    let state = AppState::new(service, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let (bound, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(addr, shutdown_signal())
        .map_err(|e| AppError::Other(e.into()))?;

    let dates = config
        .event
        .dates
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    tracing::info!("Weather API server running on {}", bound);
    tracing::info!("Cache TTL: {} hours", config.weather.cache_ttl_hours);
    tracing::info!("Event dates: {}", dates);
    tracing::info!("Using {} weather data", current_source.as_str().to_uppercase());
    if let Some(dir) = &config.static_dir {
        tracing::info!("Serving static files from {}", dir.display());
    }

    server.await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down gracefully...");
}
