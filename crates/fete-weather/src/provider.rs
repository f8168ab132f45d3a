//! Live forecast client for the OpenWeatherMap 5-day/3-hour API.

use chrono::{DateTime, FixedOffset, NaiveDate};
use fete_core::{ReqwestErrorExt, WeatherConfig};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::error::ProviderError;
use crate::icon;
use crate::types::{round_temp, ConditionCategory, ForecastDay, Source};

/// Number of forecast days returned to callers.
pub const FORECAST_DAYS: usize = 3;

const DISPLAY_DATE_FORMAT: &str = "%b %-d";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastSample>,
}

#[derive(Debug, Deserialize)]
struct ForecastSample {
    dt: i64,
    main: SampleMain,
    weather: Vec<SampleWeather>,
}

#[derive(Debug, Deserialize)]
struct SampleMain {
    temp: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct SampleWeather {
    id: u16,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Samples that fall on one local calendar date.
struct DayGroup {
    date: NaiveDate,
    label: String,
    temps: Vec<f64>,
    weather: SampleWeather,
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    base_url: String,
    api_key: String,
    latitude: f64,
    longitude: f64,
    timezone: FixedOffset,
}

impl WeatherProvider {
    /// Create a provider for the configured location. Samples are grouped
    /// into days in `timezone`.
    pub fn new(
        config: &WeatherConfig,
        api_key: &str,
        timezone: FixedOffset,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| e.into_network_error())?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            latitude: config.latitude,
            longitude: config.longitude,
            timezone,
        })
    }

    /// Fetch the multi-day forecast and reduce it to the first
    /// [`FORECAST_DAYS`] local dates. Any failure aborts the whole fetch.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_forecast(&self) -> Result<Vec<ForecastDay>, ProviderError> {
        let url = format!("{}/forecast", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", self.latitude.to_string()),
                ("lon", self.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "imperial".to_string()),
            ])
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| e.into_network_error())?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                });
            tracing::error!("Weather provider returned {}: {}", status, message);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let forecast: ForecastResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

        if forecast.list.is_empty() {
            return Err(ProviderError::Empty);
        }

        summarize_days(&forecast.list, self.timezone, FORECAST_DAYS)
    }
}

/// Group samples by local date in order of appearance and summarize the
/// first `max_days` dates. The first sample of a date supplies its condition.
fn summarize_days(
    samples: &[ForecastSample],
    timezone: FixedOffset,
    max_days: usize,
) -> Result<Vec<ForecastDay>, ProviderError> {
    let mut groups: Vec<DayGroup> = Vec::new();

    for sample in samples {
        let local = DateTime::from_timestamp(sample.dt, 0)
            .ok_or_else(|| ProviderError::Malformed(format!("invalid timestamp {}", sample.dt)))?
            .with_timezone(&timezone);
        let date = local.date_naive();

        match groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.temps.push(sample.main.temp),
            None => {
                let weather = sample.weather.first().cloned().ok_or_else(|| {
                    ProviderError::Malformed(format!("no conditions for sample at {}", sample.dt))
                })?;
                groups.push(DayGroup {
                    date,
                    label: local.format(DISPLAY_DATE_FORMAT).to_string(),
                    temps: vec![sample.main.temp],
                    weather,
                });
            }
        }
    }

    Ok(groups
        .into_iter()
        .take(max_days)
        .map(|group| {
            let high = group.temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let low = group.temps.iter().copied().fold(f64::INFINITY, f64::min);
            ForecastDay {
                date: group.label,
                condition: ConditionCategory::from_code(group.weather.id),
                description: group.weather.description,
                icon: icon::icon_for_code(group.weather.id).to_string(),
                temp_high: round_temp(high),
                temp_low: round_temp(low),
                source: Source::Live,
            }
        })
        .collect())
}
