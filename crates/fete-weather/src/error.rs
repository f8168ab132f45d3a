//! Weather-specific error types.

use std::path::PathBuf;

use fete_core::{DatabaseError, NetworkError};
use thiserror::Error;

/// Failures talking to the live forecast provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0}")]
    Network(#[from] NetworkError),

    /// Non-success status; `message` is the provider's own message when it sent one.
    #[error("API Error: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed forecast response: {0}")]
    Malformed(String),

    #[error("Weather data not available")]
    Empty,
}

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("Failed to load {}: {reason}", path.display())]
    DataFile { path: PathBuf, reason: String },

    #[error("Cache error: {0}")]
    Cache(#[from] DatabaseError),
}

impl WeatherError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Provider(ProviderError::Network(e)) => e.user_message(),
            Self::Provider(_) => "Weather service error. Please try again.",
            Self::DataFile { .. } => "Forecast data is unavailable.",
            Self::Cache(e) => e.user_message(),
        }
    }
}
