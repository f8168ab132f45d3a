//! Bundled placeholder forecasts, one file per event date.

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::WeatherError;
use crate::types::{ForecastDay, Source};

const DISPLAY_DATE_FORMAT: &str = "%b %-d";

// Files use the WeatherAPI forecast shape; only the first day is read.
#[derive(Debug, Deserialize)]
struct PlaceholderFile {
    forecast: PlaceholderForecast,
}

#[derive(Debug, Deserialize)]
struct PlaceholderForecast {
    forecastday: Vec<PlaceholderDay>,
}

#[derive(Debug, Deserialize)]
struct PlaceholderDay {
    day: DaySummary,
}

#[derive(Debug, Deserialize)]
struct DaySummary {
    maxtemp_f: f64,
    mintemp_f: f64,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

#[derive(Debug, Clone)]
pub struct PlaceholderStore {
    data_dir: PathBuf,
    dates: Vec<NaiveDate>,
}

impl PlaceholderStore {
    pub fn new(data_dir: impl Into<PathBuf>, dates: Vec<NaiveDate>) -> Self {
        Self {
            data_dir: data_dir.into(),
            dates,
        }
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(format!("{}-weather.json", date.format("%Y-%m-%d")))
    }

    /// Load one day per configured date. A missing or corrupt file is
    /// logged and that day left out.
    pub fn load(&self) -> Vec<ForecastDay> {
        self.dates
            .iter()
            .filter_map(|date| match self.load_day(*date) {
                Ok(day) => Some(day),
                Err(e) => {
                    tracing::error!("{}", e);
                    None
                }
            })
            .collect()
    }

    /// Load the placeholder day for a single date.
    pub fn load_day(&self, date: NaiveDate) -> Result<ForecastDay, WeatherError> {
        let path = self.path_for(date);
        let raw = std::fs::read_to_string(&path).map_err(|e| data_file_error(&path, e))?;
        let file: PlaceholderFile =
            serde_json::from_str(&raw).map_err(|e| data_file_error(&path, e))?;

        let first = file
            .forecast
            .forecastday
            .into_iter()
            .next()
            .ok_or_else(|| data_file_error(&path, "no forecast days"))?;

        Ok(ForecastDay::from_text(
            date.format(DISPLAY_DATE_FORMAT).to_string(),
            &first.day.condition.text,
            first.day.maxtemp_f,
            first.day.mintemp_f,
            Source::Placeholder,
        ))
    }
}

fn data_file_error(path: &Path, reason: impl std::fmt::Display) -> WeatherError {
    WeatherError::DataFile {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
