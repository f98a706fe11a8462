//! SQLite-backed single-slot weather cache.
//!
//! The table holds at most one row (`id = 1`). Every save replaces it, so the
//! cache always reflects the most recently fetched city.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use nimbus_core::error::RusqliteErrorExt;
use nimbus_core::WeatherError;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::source::WeatherCacheStore;
use crate::types::WeatherRecord;

const SLOT_ID: i64 = 1;

/// Single-slot SQLite cache. Clones share the same connection.
#[derive(Clone)]
pub struct SqliteWeatherCache {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteWeatherCache {
    /// Open (or create) the cache database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
        }
        let conn = Connection::open(path).context("Failed to open weather cache")?;
        Self::with_connection(conn)
    }

    /// Create an in-memory cache (for tests and throwaway sessions).
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS weather_cache (
                id INTEGER PRIMARY KEY,
                weather_info TEXT NOT NULL
            );
            "#,
        )
        .context("Failed to initialize weather cache schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Read the slot synchronously.
    pub fn load(&self) -> Result<Option<WeatherRecord>, WeatherError> {
        let json: Option<String> = self
            .conn
            .lock()
            .query_row(
                "SELECT weather_info FROM weather_cache WHERE id = ?1",
                params![SLOT_ID],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| e.into_cache_error())?;

        json.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| WeatherError::cache(format!("Failed to decode cached weather: {}", e)))
        })
        .transpose()
    }

    /// Replace the slot synchronously. A single statement, so the previous
    /// record survives if it fails.
    pub fn store(&self, record: &WeatherRecord) -> Result<(), WeatherError> {
        let json = serde_json::to_string(record)
            .map_err(|e| WeatherError::cache(format!("Failed to encode weather: {}", e)))?;

        self.conn
            .lock()
            .execute(
                "INSERT OR REPLACE INTO weather_cache (id, weather_info) VALUES (?1, ?2)",
                params![SLOT_ID, json],
            )
            .map_err(|e| e.into_cache_error())?;
        Ok(())
    }

    /// Remove the cached record.
    pub fn clear(&self) -> Result<(), WeatherError> {
        self.conn
            .lock()
            .execute("DELETE FROM weather_cache", [])
            .map_err(|e| e.into_cache_error())?;
        Ok(())
    }
}

#[async_trait]
impl WeatherCacheStore for SqliteWeatherCache {
    async fn read_cached_weather(&self) -> Result<Option<WeatherRecord>, WeatherError> {
        let cache = self.clone();
        tokio::task::spawn_blocking(move || cache.load())
            .await
            .map_err(|e| WeatherError::cache(format!("Cache read task failed: {}", e)))?
    }

    async fn write_cached_weather(&self, record: &WeatherRecord) -> Result<(), WeatherError> {
        let cache = self.clone();
        let record = record.clone();
        tracing::debug!("Caching weather for {}", record.location.name);
        tokio::task::spawn_blocking(move || cache.store(&record))
            .await
            .map_err(|e| WeatherError::cache(format!("Cache write task failed: {}", e)))??;

        Ok(())
    }
}
