//! Adapter contracts consumed by the repositories.
//!
//! Remote sources talk to the weather API; the cache store owns the single
//! persisted weather slot. Implementations must do their I/O off the caller's
//! presentation context (async I/O or `spawn_blocking`).

use async_trait::async_trait;
use nimbus_core::WeatherError;

use crate::types::{LocationCandidate, WeatherRecord};

/// Remote source of current weather for a city.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch current weather for `city`.
    ///
    /// # Errors
    /// `NotFound` for a body-less success, `Http` for a non-2xx status,
    /// `Network` when the transport fails.
    async fn fetch_weather(&self, city: &str) -> Result<WeatherRecord, WeatherError>;
}

/// Remote location search.
#[async_trait]
pub trait LocationSearch: Send + Sync {
    /// Search locations matching `query`, in server order. May be empty.
    ///
    /// # Errors
    /// Same failure kinds as [`WeatherSource::fetch_weather`].
    async fn search_locations(&self, query: &str)
        -> Result<Vec<LocationCandidate>, WeatherError>;
}

/// Single-slot persistent weather cache.
#[async_trait]
pub trait WeatherCacheStore: Send + Sync {
    /// Read the cached record, `None` when nothing was ever saved.
    ///
    /// # Errors
    /// `Cache` when the underlying storage fails.
    async fn read_cached_weather(&self) -> Result<Option<WeatherRecord>, WeatherError>;

    /// Replace the cached record unconditionally.
    ///
    /// # Errors
    /// `Cache` when the underlying storage fails; the previous record is kept.
    async fn write_cached_weather(&self, record: &WeatherRecord) -> Result<(), WeatherError>;
}
