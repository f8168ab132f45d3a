//! SQLite-backed forecast cache.
//!
//! One row per location key, overwritten on every store. Rows are never
//! deleted; an expired row stays until the next successful fetch replaces it.

use chrono::{DateTime, Duration, Utc};
use fete_core::{DatabaseError, RusqliteErrorExt};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::icon;
use crate::types::{ForecastDay, Source};

/// A cached forecast row.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub days: Vec<ForecastDay>,
    pub source: Source,
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.cached_at
    }
}

/// A row as stored, before the payload is decoded.
struct CacheRow {
    forecast_json: String,
    source: String,
    cached_at_ms: i64,
}

impl CacheRow {
    fn cached_at(&self, key: &str) -> Result<DateTime<Utc>, DatabaseError> {
        DateTime::from_timestamp_millis(self.cached_at_ms).ok_or_else(|| {
            DatabaseError::Corruption(format!("cached_at for {}: {}", key, self.cached_at_ms))
        })
    }

    fn decode(self, key: &str) -> Result<CacheEntry, DatabaseError> {
        let cached_at = self.cached_at(key)?;
        let mut days: Vec<ForecastDay> = serde_json::from_str(&self.forecast_json)
            .map_err(|e| DatabaseError::Corruption(format!("forecast_data for {}: {}", key, e)))?;
        for day in days.iter_mut().filter(|d| d.icon.is_empty()) {
            day.icon = icon::icon_for_text(&day.description).to_string();
        }
        let source: Source = self.source.parse().map_err(DatabaseError::Corruption)?;

        Ok(CacheEntry {
            days,
            source,
            cached_at,
        })
    }
}

pub struct WeatherCache {
    conn: Mutex<Connection>,
}

impl WeatherCache {
    /// Open (or create) the cache database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::ConnectionFailed(format!("{}: {}", parent.display(), e))
            })?;
        }

        let conn = Connection::open(path).map_err(|e| e.into_database_error())?;
        Self::with_connection(conn)
    }

    /// Create an in-memory cache (for testing).
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|e| e.into_database_error())?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, DatabaseError> {
        init_schema(&conn).map_err(|e| e.into_database_error())?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Read the entry for `key`, fresh or not.
    pub fn get(&self, key: &str) -> Result<Option<CacheEntry>, DatabaseError> {
        match self.get_row(key)? {
            Some(row) => row.decode(key).map(Some),
            None => Ok(None),
        }
    }

    /// Read the entry for `key` only if it is younger than `ttl`.
    ///
    /// A stale row is a miss without its payload being decoded, so a row
    /// written in an older format is simply replaced by the next store.
    pub fn get_fresh(
        &self,
        key: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Option<CacheEntry>, DatabaseError> {
        let Some(row) = self.get_row(key)? else {
            return Ok(None);
        };

        // Fresh means strictly younger than the TTL
        if now - row.cached_at(key)? >= ttl {
            tracing::info!("Cache expired for {}", key);
            return Ok(None);
        }

        let entry = row.decode(key)?;
        tracing::info!(
            "Cache hit for {} (age: {} hours)",
            key,
            entry.age(now).num_hours()
        );
        Ok(Some(entry))
    }

    fn get_row(&self, key: &str) -> Result<Option<CacheRow>, DatabaseError> {
        self.conn
            .lock()
            .query_row(
                "SELECT forecast_data, source, cached_at FROM weather_cache WHERE location_key = ?1",
                params![key],
                |row| {
                    Ok(CacheRow {
                        forecast_json: row.get(0)?,
                        source: row.get(1)?,
                        cached_at_ms: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(|e| e.into_database_error())
    }

    /// Insert or replace the entry for `key`.
    pub fn put(
        &self,
        key: &str,
        days: &[ForecastDay],
        source: Source,
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let forecast_json = serde_json::to_string(days)
            .map_err(|e| DatabaseError::QueryFailed(format!("serialize forecast: {}", e)))?;

        self.conn
            .lock()
            .execute(
                r#"
                INSERT INTO weather_cache (location_key, forecast_data, source, cached_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(location_key) DO UPDATE SET
                    forecast_data = excluded.forecast_data,
                    source = excluded.source,
                    cached_at = excluded.cached_at
                "#,
                params![key, forecast_json, source.as_str(), now.timestamp_millis()],
            )
            .map_err(|e| e.into_database_error())?;

        tracing::info!("Weather data cached for {}", key);
        Ok(())
    }

    /// Number of cached rows.
    pub fn len(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM weather_cache", [], |row| row.get(0))
            .map_err(|e| e.into_database_error())?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn is_empty(&self) -> Result<bool, DatabaseError> {
        Ok(self.len()? == 0)
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS weather_cache (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            location_key TEXT UNIQUE NOT NULL,
            forecast_data TEXT NOT NULL,
            source TEXT NOT NULL DEFAULT 'placeholder',
            cached_at INTEGER NOT NULL
        );
        "#,
    )?;

    // Databases created before the source column existed
    let has_source = conn
        .prepare("SELECT 1 FROM pragma_table_info('weather_cache') WHERE name = 'source'")?
        .exists([])?;
    if !has_source {
        conn.execute_batch(
            "ALTER TABLE weather_cache ADD COLUMN source TEXT NOT NULL DEFAULT 'placeholder';",
        )?;
    }

    Ok(())
}
