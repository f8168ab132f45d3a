use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "FETE_CONFIG";
/// Environment variable carrying the live weather API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const PORT_ENV: &str = "PORT";
pub const GATE_PASSWORD_ENV: &str = "FETE_GATE_PASSWORD";

const DEFAULT_CONFIG_FILE: &str = "fete.toml";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a single-line message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port the HTTP server listens on
    pub port: u16,

    /// Directory holding the single-page app and its HTML fragments.
    /// Static serving is disabled when unset.
    pub static_dir: Option<PathBuf>,

    /// Weather provider, placeholder data and cache settings
    pub weather: WeatherConfig,

    /// Event window the forecast is for
    pub event: EventConfig,

    /// Shared-password gate for the site
    pub gate: GateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Live provider API key. Usually supplied through `OPENWEATHER_API_KEY`.
    pub api_key: Option<String>,

    /// Base URL of the live forecast API
    pub base_url: String,

    pub latitude: f64,
    pub longitude: f64,

    /// Directory with one `<date>-weather.json` placeholder file per event date
    pub data_dir: PathBuf,

    /// SQLite file backing the forecast cache
    pub cache_path: PathBuf,

    /// Logical key of the single cached forecast row
    pub cache_key: String,

    /// How long a cached forecast stays valid
    pub cache_ttl_hours: u32,

    /// Timeout for outbound provider requests
    pub request_timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            latitude: 33.9615,
            longitude: -116.5014,
            data_dir: PathBuf::from("data"),
            cache_path: PathBuf::from("cache/weather-cache.db"),
            cache_key: "wedding-weather".to_string(),
            cache_ttl_hours: 24,
            request_timeout_secs: 10,
        }
    }
}

impl WeatherConfig {
    /// The configured API key, or `MissingSetting` when absent or blank.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigError::MissingSetting(API_KEY_ENV.to_string())),
        }
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.cache_ttl_hours))
    }
}

/// Event window. Instants are RFC 3339 strings with an explicit offset;
/// that offset is also the timezone used to group and label forecast days.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// First instant of the event
    pub start: DateTime<FixedOffset>,

    /// First instant after the event
    pub end: DateTime<FixedOffset>,

    /// Calendar days of the event, one placeholder file each
    pub dates: Vec<NaiveDate>,

    /// Live data is used when the event starts within this many days
    pub live_window_days: i64,
}

impl Default for EventConfig {
    fn default() -> Self {
        // Pacific daylight time at the default venue
        let at_midnight = |date: &str| {
            DateTime::parse_from_rfc3339(&format!("{}T00:00:00-07:00", date)).unwrap_or_default()
        };
        Self {
            start: at_midnight("2025-10-31"),
            end: at_midnight("2025-11-03"),
            dates: [(2025, 10, 31), (2025, 11, 1), (2025, 11, 2)]
                .into_iter()
                .filter_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
                .collect(),
            live_window_days: 5,
        }
    }
}

/// Shared-password gate for the site.
///
/// This only keeps casual visitors out. It is not authentication: the
/// password is shared by every guest and the issued token is derived from it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3001,
            static_dir: None,
            weather: WeatherConfig::default(),
            event: EventConfig::default(),
            gate: GateConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the file named by `FETE_CONFIG` (default
    /// `fete.toml`), then apply environment overrides. A missing file means
    /// defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            tracing::info!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration and validate it.
    ///
    /// Fails when the API key is missing or validation reports errors;
    /// warnings are logged.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        config.weather.require_api_key()?;

        let validation = config.validate();
        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::NotReadable(format!("{}: {}", path.display(), e)))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Override settings from environment-style lookups.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV) {
            self.weather.api_key = Some(key);
        }

        if let Some(port) = lookup(PORT_ENV) {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(e) => tracing::warn!("Ignoring invalid {} value {:?}: {}", PORT_ENV, port, e),
            }
        }

        if let Some(password) = lookup(GATE_PASSWORD_ENV) {
            self.gate.password = Some(password);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.weather.require_api_key().is_err() {
            result.add_error(
                "weather.api_key",
                format!("{} environment variable is not set", API_KEY_ENV),
            );
        }

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);

        if !(-90.0..=90.0).contains(&self.weather.latitude) {
            result.add_error("weather.latitude", "Latitude must be between -90 and 90");
        }
        if !(-180.0..=180.0).contains(&self.weather.longitude) {
            result.add_error("weather.longitude", "Longitude must be between -180 and 180");
        }

        if self.weather.cache_ttl_hours == 0 {
            result.add_warning(
                "weather.cache_ttl_hours",
                "Cache disabled (0 hours), every request hits the provider",
            );
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if !self.weather.data_dir.is_dir() {
            result.add_warning(
                "weather.data_dir",
                format!(
                    "Placeholder directory does not exist: {}",
                    self.weather.data_dir.display()
                ),
            );
        }

        if self.event.end <= self.event.start {
            result.add_error("event.end", "Event end must be after event start");
        }

        if self.event.live_window_days < 0 {
            result.add_error("event.live_window_days", "Live window cannot be negative");
        }

        if self.event.dates.is_empty() {
            result.add_warning("event.dates", "No event dates, placeholder forecast will be empty");
        }

        if let Some(dir) = &self.static_dir {
            if !dir.is_dir() {
                result.add_warning(
                    "static_dir",
                    format!("Static directory does not exist: {}", dir.display()),
                );
            }
        }

        if self.gate.password.as_deref().is_some_and(str::is_empty) {
            result.add_warning("gate.password", "Gate password is empty");
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }
}
