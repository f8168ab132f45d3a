//! Forecast orchestration: cache lookup, source selection, fetch and store.

use chrono::{DateTime, Duration, Utc};
use fete_core::{AppError, Config};
use std::sync::Arc;

use crate::cache::WeatherCache;
use crate::error::{ProviderError, WeatherError};
use crate::placeholder::PlaceholderStore;
use crate::policy::EventWindow;
use crate::provider::WeatherProvider;
use crate::types::{Forecast, Source};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub struct WeatherService {
    window: EventWindow,
    provider: WeatherProvider,
    placeholder: PlaceholderStore,
    cache: WeatherCache,
    cache_key: String,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl WeatherService {
    pub fn new(
        window: EventWindow,
        provider: WeatherProvider,
        placeholder: PlaceholderStore,
        cache: WeatherCache,
        cache_key: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            window,
            provider,
            placeholder,
            cache,
            cache_key: cache_key.into(),
            ttl,
            clock: Arc::new(SystemClock),
        }
    }

    /// Build the service from configuration, opening the cache database.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let api_key = config.weather.require_api_key()?;
        let window = EventWindow::from_config(&config.event);
        let provider = WeatherProvider::new(&config.weather, api_key, *window.start.offset())
            .map_err(|e| match e {
                ProviderError::Network(e) => AppError::Network(e),
                other => AppError::Other(other.into()),
            })?;
        let placeholder =
            PlaceholderStore::new(&config.weather.data_dir, config.event.dates.clone());
        let cache = WeatherCache::open(&config.weather.cache_path)?;

        Ok(Self::new(
            window,
            provider,
            placeholder,
            cache,
            &config.weather.cache_key,
            config.weather.cache_ttl(),
        ))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    /// Source a cache miss would use right now.
    pub fn current_source(&self) -> Source {
        self.window.select_source(self.clock.now())
    }

    /// Serve the cached forecast while it is fresh; otherwise fetch from
    /// the selected source and overwrite the cache.
    ///
    /// A live fetch failure aborts the request and leaves the cache as it was.
    pub async fn forecast(&self) -> Result<Forecast, WeatherError> {
        let now = self.clock.now();

        if let Some(entry) = self.cache.get_fresh(&self.cache_key, now, self.ttl)? {
            return Ok(Forecast {
                days: entry.days,
                source: entry.source,
                cached: true,
            });
        }

        let days_until = self.window.days_until_start(now);
        let source = self.window.select_source(now);
        tracing::info!(
            days_until_event = days_until,
            before_event_end = now < self.window.end.with_timezone(&Utc),
            "Selected {} forecast source",
            source
        );

        let days = match source {
            Source::Live => {
                tracing::info!(
                    "Within {} days of the event, fetching live weather data",
                    self.window.live_window_days
                );
                self.provider.fetch_forecast().await?
            }
            Source::Placeholder => {
                tracing::info!("Using placeholder weather data");
                self.placeholder.load()
            }
        };

        self.cache.put(&self.cache_key, &days, source, now)?;

        Ok(Forecast {
            days,
            source,
            cached: false,
        })
    }
}
