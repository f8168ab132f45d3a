//! Client for the forecast endpoint.

use fete_core::ReqwestErrorExt;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::error::WidgetError;
use crate::render;

const WEATHER_PATH: &str = "api/weather";

/// The subset of a forecast day the cards display.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CardDay {
    pub date: String,
    #[serde(rename = "main")]
    pub category: String,
    pub description: String,
    pub temp_high: i32,
    pub temp_low: i32,
}

#[derive(Debug, Deserialize)]
struct WeatherEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<Vec<CardDay>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WidgetClient {
    base_url: Url,
    client: Arc<Client>,
}

impl WidgetClient {
    /// Client for the API served at `base_url`, e.g. `http://localhost:3001`.
    pub fn new(base_url: &str) -> Result<Self, WidgetError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            client: Arc::new(Client::new()),
        })
    }

    /// Fetch the forecast once. Every kind of failure is an error, including
    /// a successful response with no days.
    pub async fn fetch(&self) -> Result<Vec<CardDay>, WidgetError> {
        let url = self.base_url.join(WEATHER_PATH)?;
        tracing::debug!("Fetching forecast from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let body = response
            .error_for_status()
            .map_err(|e| e.into_network_error())?
            .text()
            .await
            .map_err(|e| e.into_network_error())?;
        let envelope: WeatherEnvelope =
            serde_json::from_str(&body).map_err(|e| WidgetError::Malformed(e.to_string()))?;

        if !envelope.success {
            return Err(WidgetError::Unsuccessful(
                envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        match envelope.data {
            Some(days) if !days.is_empty() => Ok(days),
            _ => Err(WidgetError::NoData),
        }
    }

    /// Markup for the widget: the cards, or the error placeholder.
    pub async fn load(&self) -> String {
        match self.fetch().await {
            Ok(days) => render::render_cards(&days),
            Err(e) => {
                tracing::error!("Error loading weather: {}", e);
                render::render_error(e.user_message())
            }
        }
    }
}
