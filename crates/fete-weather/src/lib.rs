//! Event weather forecasts for Fete.
//!
//! Serves a short forecast for the event venue. Far from the event the
//! forecast comes from bundled placeholder files; within a few days of the
//! start it comes from the live provider. Results are cached in SQLite.

pub mod cache;
pub mod error;
pub mod icon;
pub mod placeholder;
pub mod policy;
pub mod provider;
pub mod service;
pub mod types;

pub use cache::{CacheEntry, WeatherCache};
pub use error::{ProviderError, WeatherError};
pub use placeholder::PlaceholderStore;
pub use policy::EventWindow;
pub use provider::{WeatherProvider, FORECAST_DAYS};
pub use service::{Clock, FixedClock, SystemClock, WeatherService};
pub use types::*;
