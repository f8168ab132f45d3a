//! Choosing between live and placeholder forecasts.

use chrono::{DateTime, FixedOffset, Utc};
use fete_core::EventConfig;

use crate::types::Source;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// The instants that decide which forecast source is relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// Live data is used when the event starts within this many days
    pub live_window_days: i64,
}

impl EventWindow {
    pub fn from_config(event: &EventConfig) -> Self {
        Self {
            start: event.start,
            end: event.end,
            live_window_days: event.live_window_days,
        }
    }

    /// Whole days until the event starts, rounded toward negative infinity.
    /// Negative once the start has passed.
    pub fn days_until_start(&self, now: DateTime<Utc>) -> i64 {
        let millis = (self.start.with_timezone(&Utc) - now).num_milliseconds();
        millis.div_euclid(MILLIS_PER_DAY)
    }

    /// Live data is used only while the event start is between 0 and
    /// `live_window_days` whole days away and the event has not ended.
    ///
    /// Once the start instant passes, `days_until_start` turns negative and
    /// the placeholder is served again for the rest of the event.
    pub fn select_source(&self, now: DateTime<Utc>) -> Source {
        if now >= self.end.with_timezone(&Utc) {
            return Source::Placeholder;
        }

        let days = self.days_until_start(now);
        if (0..=self.live_window_days).contains(&days) {
            Source::Live
        } else {
            Source::Placeholder
        }
    }
}
