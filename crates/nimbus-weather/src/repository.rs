//! Cache-aside orchestration for weather and location search.
//!
//! Weather: a named city is always fetched remotely and written through to the
//! single cache slot; no city means "show whatever is cached". Search is
//! remote-only.

use std::sync::Arc;

use nimbus_core::{Outcome, WeatherError, UNEXPECTED_ERROR_MESSAGE};

use crate::source::{LocationSearch, WeatherCacheStore, WeatherSource};
use crate::stream::OutcomeStream;
use crate::types::{LocationCandidate, WeatherRecord};

pub const NO_WEATHER_TITLE: &str = "No Weather Data";
pub const NO_WEATHER_MESSAGE: &str = "Please search for a city to see weather information";

/// Weather orchestrator over a remote source and the cache slot.
#[derive(Clone)]
pub struct WeatherRepository {
    remote: Arc<dyn WeatherSource>,
    cache: Arc<dyn WeatherCacheStore>,
}

impl WeatherRepository {
    pub fn new(remote: Arc<dyn WeatherSource>, cache: Arc<dyn WeatherCacheStore>) -> Self {
        Self { remote, cache }
    }

    /// Weather for `city`, or the cached record when `city` is `None`.
    ///
    /// Emits `Loading`, then one of:
    /// - `Success(record)` after a remote fetch that was cached, or a cache hit;
    /// - `Empty` when no city was given and nothing is cached;
    /// - `Error` when the fetch, the cache write or the cache read fails.
    pub fn weather_info(&self, city: Option<String>) -> OutcomeStream<WeatherRecord> {
        let remote = Arc::clone(&self.remote);
        let cache = Arc::clone(&self.cache);

        OutcomeStream::spawn("weather fetch", async move {
            match city {
                Some(city) => fetch_and_cache(remote.as_ref(), cache.as_ref(), &city).await,
                None => read_cached(cache.as_ref()).await,
            }
        })
    }
}

async fn fetch_and_cache(
    remote: &dyn WeatherSource,
    cache: &dyn WeatherCacheStore,
    city: &str,
) -> Outcome<WeatherRecord> {
    tracing::debug!("Fetching weather for {:?} from remote", city);

    let record = match remote.fetch_weather(city).await {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Weather fetch for {:?} failed: {}", city, e);
            return Outcome::error(weather_message(&e));
        }
    };

    // A fetch only counts once it is written through to the cache
    match cache.write_cached_weather(&record).await {
        Ok(()) => Outcome::success(record),
        Err(e) => {
            tracing::warn!("Caching weather for {:?} failed: {}", city, e);
            Outcome::error(weather_message(&e))
        }
    }
}

async fn read_cached(cache: &dyn WeatherCacheStore) -> Outcome<WeatherRecord> {
    tracing::debug!("No city given, reading cached weather");

    match cache.read_cached_weather().await {
        Ok(Some(record)) => Outcome::success(record),
        Ok(None) => Outcome::empty(NO_WEATHER_TITLE, NO_WEATHER_MESSAGE),
        Err(e) => {
            tracing::warn!("Reading cached weather failed: {}", e);
            Outcome::error(weather_message(&e))
        }
    }
}

fn weather_message(error: &WeatherError) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        UNEXPECTED_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

/// Remote-only location search orchestrator.
#[derive(Clone)]
pub struct SearchRepository {
    remote: Arc<dyn LocationSearch>,
}

impl SearchRepository {
    pub fn new(remote: Arc<dyn LocationSearch>) -> Self {
        Self { remote }
    }

    /// Emits `Loading`, then `Success(candidates)` (possibly empty) or `Error`.
    /// Never emits `Empty`; an empty result list is still a success.
    pub fn search_results(&self, query: impl Into<String>) -> OutcomeStream<Vec<LocationCandidate>> {
        let remote = Arc::clone(&self.remote);
        let query = query.into();

        OutcomeStream::spawn("location search", async move {
            match remote.search_locations(&query).await {
                Ok(candidates) => {
                    tracing::debug!("Search {:?} matched {} locations", query, candidates.len());
                    Outcome::success(candidates)
                }
                Err(e) => {
                    tracing::warn!("Search {:?} failed: {}", query, e);
                    Outcome::error(e.to_string())
                }
            }
        })
    }
}
