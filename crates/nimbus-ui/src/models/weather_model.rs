//! Weather screen view model.
//!
//! `refresh` reads the remembered city and runs the weather policy for it, or
//! reads the cache when no city was ever selected.

use std::sync::Arc;

use nimbus_weather::{CityPreferences, WeatherRepository};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::{feed, stream_closed_message};
use crate::reducer::reduce_weather;
use crate::state::WeatherScreenState;

pub const FETCH_WEATHER_PREFIX: &str = "Failed to fetch weather";

pub struct WeatherViewModel {
    repository: WeatherRepository,
    preferences: CityPreferences,
    state: Arc<watch::Sender<WeatherScreenState>>,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl WeatherViewModel {
    pub fn new(repository: WeatherRepository, preferences: CityPreferences) -> Self {
        Self::with_cancellation(repository, preferences, CancellationToken::new())
    }

    /// Build a view model whose work stops when `cancel` fires.
    pub fn with_cancellation(
        repository: WeatherRepository,
        preferences: CityPreferences,
        cancel: CancellationToken,
    ) -> Self {
        let (state, _) = watch::channel(WeatherScreenState::default());
        Self {
            repository,
            preferences,
            state: Arc::new(state),
            cancel,
            tracker: TaskTracker::new(),
        }
    }

    /// Current screen state.
    pub fn state(&self) -> WeatherScreenState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WeatherScreenState> {
        self.state.subscribe()
    }

    /// Start a refresh. The returned handle completes once the screen state
    /// holds the terminal result, or the refresh was cancelled.
    pub fn refresh(&self) -> JoinHandle<()> {
        let repository = self.repository.clone();
        let preferences = self.preferences.clone();
        let state = Arc::clone(&self.state);
        let cancel = self.cancel.clone();

        self.tracker.spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Weather refresh cancelled");
                }
                _ = run_refresh(repository, preferences, &state) => {}
            }
        })
    }

    /// Cancel in-flight refreshes and wait for them to stop.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}

async fn run_refresh(
    repository: WeatherRepository,
    preferences: CityPreferences,
    state: &watch::Sender<WeatherScreenState>,
) {
    let city = match preferences.city().await {
        Ok(city) => city,
        Err(e) => {
            tracing::warn!("Failed to read saved city: {}", e);
            state.send_replace(WeatherScreenState::Error(format!(
                "{}: {}",
                FETCH_WEATHER_PREFIX, e
            )));
            return;
        }
    };

    tracing::debug!(city = ?city, "Refreshing weather");
    let completed = feed(repository.weather_info(city), |outcome| {
        state.send_replace(reduce_weather(outcome));
    })
    .await;

    if !completed {
        state.send_replace(WeatherScreenState::Error(stream_closed_message(
            FETCH_WEATHER_PREFIX,
        )));
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::testing::{record, FailingStore, FakeWeather};
    use nimbus_core::WeatherError;
    use nimbus_weather::{
        MemoryPreferences, SqliteWeatherCache, WeatherCacheStore, NO_WEATHER_MESSAGE,
        NO_WEATHER_TITLE,
    };

    fn view_model(
        remote: Arc<FakeWeather>,
        cache: SqliteWeatherCache,
        preferences: CityPreferences,
    ) -> WeatherViewModel {
        WeatherViewModel::new(WeatherRepository::new(remote, Arc::new(cache)), preferences)
    }

    fn memory_preferences() -> CityPreferences {
        CityPreferences::new(Arc::new(MemoryPreferences::new()))
    }

    #[tokio::test]
    async fn test_initial_state_is_loading() {
        let vm = view_model(
            Arc::new(FakeWeather::new()),
            SqliteWeatherCache::in_memory().unwrap(),
            memory_preferences(),
        );
        assert_eq!(vm.state(), WeatherScreenState::Loading);
    }

    #[tokio::test]
    async fn test_refresh_without_city_and_empty_cache() {
        let remote = Arc::new(FakeWeather::new());
        let vm = view_model(
            remote.clone(),
            SqliteWeatherCache::in_memory().unwrap(),
            memory_preferences(),
        );

        vm.refresh().await.unwrap();

        assert_eq!(
            vm.state(),
            WeatherScreenState::Empty {
                title: NO_WEATHER_TITLE.to_string(),
                message: NO_WEATHER_MESSAGE.to_string(),
            }
        );
        assert_eq!(remote.calls(), 0);
    }

    #[tokio::test]
    async fn test_refresh_without_city_reads_cache() {
        let cache = SqliteWeatherCache::in_memory().unwrap();
        cache.write_cached_weather(&record("Oslo")).await.unwrap();
        let vm = view_model(Arc::new(FakeWeather::new()), cache, memory_preferences());

        vm.refresh().await.unwrap();

        assert_eq!(vm.state(), WeatherScreenState::Success(record("Oslo")));
    }

    #[tokio::test]
    async fn test_refresh_uses_saved_city() {
        let remote = Arc::new(FakeWeather::new().with_city("Paris", Ok(record("Paris"))));
        let preferences = memory_preferences();
        preferences.save_city("Paris").await.unwrap();
        let vm = view_model(
            remote.clone(),
            SqliteWeatherCache::in_memory().unwrap(),
            preferences,
        );

        vm.refresh().await.unwrap();

        assert_eq!(vm.state(), WeatherScreenState::Success(record("Paris")));
        assert_eq!(remote.calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_renders_remote_error() {
        let remote = Arc::new(FakeWeather::new().with_city("Paris", Err(WeatherError::http(503))));
        let preferences = memory_preferences();
        preferences.save_city("Paris").await.unwrap();
        let vm = view_model(remote, SqliteWeatherCache::in_memory().unwrap(), preferences);

        vm.refresh().await.unwrap();

        assert_eq!(
            vm.state(),
            WeatherScreenState::Error("HTTP 503 Service Unavailable".to_string())
        );
    }

    #[tokio::test]
    async fn test_unreadable_preferences_are_reported() {
        let vm = view_model(
            Arc::new(FakeWeather::new()),
            SqliteWeatherCache::in_memory().unwrap(),
            CityPreferences::new(Arc::new(FailingStore)),
        );

        vm.refresh().await.unwrap();

        let WeatherScreenState::Error(message) = vm.state() else {
            panic!("expected error state, got {:?}", vm.state());
        };
        assert!(message.starts_with("Failed to fetch weather: "));
    }

    #[tokio::test]
    async fn test_subscriber_sees_terminal_state() {
        let remote = Arc::new(FakeWeather::new().with_city("Rome", Ok(record("Rome"))));
        let preferences = memory_preferences();
        preferences.save_city("Rome").await.unwrap();
        let vm = view_model(remote, SqliteWeatherCache::in_memory().unwrap(), preferences);
        let mut rx = vm.subscribe();

        let _refresh = vm.refresh();
        let state = rx
            .wait_for(|state| !state.is_loading())
            .await
            .unwrap()
            .clone();

        assert_eq!(state, WeatherScreenState::Success(record("Rome")));
    }

    #[tokio::test]
    async fn test_shutdown_cancels_in_flight_refresh() {
        let remote = Arc::new(FakeWeather::new().hanging());
        let preferences = memory_preferences();
        preferences.save_city("Lima").await.unwrap();
        let vm = view_model(
            remote.clone(),
            SqliteWeatherCache::in_memory().unwrap(),
            preferences,
        );

        let handle = vm.refresh();
        remote.wait_for_call().await;
        vm.shutdown().await;

        handle.await.unwrap();
        assert_eq!(vm.state(), WeatherScreenState::Loading);
    }
}
