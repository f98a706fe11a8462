//! Centralized application services.
//!
//! `AppServices` builds every adapter explicitly, hands them to the
//! repositories and view models, and starts the selection coordinator. There
//! is no process-global state: whoever owns an `AppServices` owns the cache
//! connection and the background tasks, and `shutdown` stops them.

use std::sync::Arc;

use nimbus_core::{AppError, Config};
use nimbus_weather::{
    CityPreferences, FilePreferences, KeyValueStore, LocationSearch, SearchRepository,
    SqliteWeatherCache, WeatherApiClient, WeatherCacheStore, WeatherRepository, WeatherSource,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::coordinator::SelectionCoordinator;
use crate::models::{SearchViewModel, WeatherViewModel};

/// Concrete collaborators behind the repositories.
#[derive(Clone)]
pub struct Adapters {
    pub weather: Arc<dyn WeatherSource>,
    pub search: Arc<dyn LocationSearch>,
    pub cache: Arc<dyn WeatherCacheStore>,
    pub preferences: Arc<dyn KeyValueStore>,
}

impl Adapters {
    /// Build the production adapters described by `config`.
    ///
    /// # Errors
    /// Fails when the HTTP client cannot be built or the cache database
    /// cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = Arc::new(WeatherApiClient::new(&config.api)?);

        let cache_path = config.storage.cache_path();
        let cache = SqliteWeatherCache::open(&cache_path)?;
        tracing::info!("Weather cache opened at {:?}", cache_path);

        let preferences = FilePreferences::new(config.storage.preferences_path());
        tracing::debug!("Preferences stored at {:?}", preferences.path());

        Ok(Self {
            weather: client.clone(),
            search: client,
            cache: Arc::new(cache),
            preferences: Arc::new(preferences),
        })
    }
}

pub struct AppServices {
    weather: WeatherViewModel,
    search: SearchViewModel,
    coordinator: Arc<SelectionCoordinator>,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl AppServices {
    /// Wire the production adapters. Must be called within a tokio runtime.
    ///
    /// # Errors
    /// See [`Adapters::from_config`].
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self::new(Adapters::from_config(config)?))
    }

    /// Wire the given adapters and start the selection coordinator.
    /// Must be called within a tokio runtime.
    pub fn new(adapters: Adapters) -> Self {
        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();

        let weather_repository = WeatherRepository::new(adapters.weather, adapters.cache);
        let search_repository = SearchRepository::new(adapters.search);
        let preferences = CityPreferences::new(adapters.preferences);

        let (selections_tx, selections_rx) = mpsc::unbounded_channel();
        let coordinator = Arc::new(SelectionCoordinator::new(
            weather_repository.clone(),
            preferences.clone(),
        ));
        tracker.spawn({
            let coordinator = Arc::clone(&coordinator);
            let cancel = cancel.clone();
            async move { coordinator.run(selections_rx, cancel).await }
        });

        tracing::info!("AppServices initialized");

        Self {
            weather: WeatherViewModel::with_cancellation(
                weather_repository,
                preferences,
                cancel.child_token(),
            ),
            search: SearchViewModel::with_cancellation(
                search_repository,
                selections_tx,
                cancel.child_token(),
            ),
            coordinator,
            cancel,
            tracker,
        }
    }

    pub fn weather(&self) -> &WeatherViewModel {
        &self.weather
    }

    pub fn search(&self) -> &SearchViewModel {
        &self.search
    }

    /// Weather for the city picked by the latest successful search.
    pub fn coordinator(&self) -> &SelectionCoordinator {
        &self.coordinator
    }

    /// Cancel all in-flight work and wait for background tasks to stop.
    pub async fn shutdown(&self) {
        tracing::info!("AppServices shutdown initiated");

        self.cancel.cancel();
        self.weather.shutdown().await;
        self.search.shutdown().await;
        self.tracker.close();
        self.tracker.wait().await;

        tracing::info!("AppServices shutdown complete");
    }
}
