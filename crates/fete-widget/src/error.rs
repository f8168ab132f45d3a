use fete_core::NetworkError;
use thiserror::Error;

/// The one message visitors see, whatever went wrong.
pub const FAILURE_MESSAGE: &str = "Unable to load weather forecast";

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Connection failures and non-success statuses
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("Forecast request failed: {0}")]
    Unsuccessful(String),

    #[error("Invalid weather data")]
    NoData,

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl WidgetError {
    pub fn user_message(&self) -> &'static str {
        FAILURE_MESSAGE
    }
}
