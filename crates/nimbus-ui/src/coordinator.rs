//! Chains a search selection into a remembered city and a weather fetch.
//!
//! The search view model only reports [`CitySelected`]; this coordinator owns
//! the side effects. Each selection persists the city under the `city_name`
//! key and then runs the weather policy for it, folding the outcomes into the
//! coordinator's own weather state.

use nimbus_weather::{CityPreferences, WeatherRepository};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::models::{feed, stream_closed_message};
use crate::reducer::{reduce_weather, CitySelected};
use crate::state::WeatherScreenState;

pub const WEATHER_FETCH_PREFIX: &str = "Weather fetch failed";

pub struct SelectionCoordinator {
    repository: WeatherRepository,
    preferences: CityPreferences,
    state: watch::Sender<WeatherScreenState>,
}

impl SelectionCoordinator {
    pub fn new(repository: WeatherRepository, preferences: CityPreferences) -> Self {
        // Blank until the first selection arrives
        let (state, _) = watch::channel(blank_state());
        Self {
            repository,
            preferences,
            state,
        }
    }

    /// Weather for the most recently selected city.
    pub fn state(&self) -> WeatherScreenState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WeatherScreenState> {
        self.state.subscribe()
    }

    /// Persist the selected city and fetch its weather.
    pub async fn handle(&self, selection: CitySelected) {
        let CitySelected { city } = selection;

        if city.trim().is_empty() {
            tracing::debug!("Ignoring blank city selection");
            self.state.send_replace(blank_state());
            return;
        }

        if let Err(e) = self.preferences.save_city(&city).await {
            tracing::warn!("Failed to remember {}: {}", city, e);
            self.state.send_replace(WeatherScreenState::Error(format!(
                "{}: {}",
                WEATHER_FETCH_PREFIX, e
            )));
            return;
        }

        tracing::debug!("Fetching weather for selected city {}", city);
        let completed = feed(self.repository.weather_info(Some(city)), |outcome| {
            self.state.send_replace(reduce_weather(outcome));
        })
        .await;

        if !completed {
            self.state
                .send_replace(WeatherScreenState::Error(stream_closed_message(
                    WEATHER_FETCH_PREFIX,
                )));
        }
    }

    /// Handle selections in arrival order until the channel closes or
    /// `cancel` fires. A cancelled selection commits no terminal state.
    pub async fn run(
        &self,
        mut selections: mpsc::UnboundedReceiver<CitySelected>,
        cancel: CancellationToken,
    ) {
        tracing::debug!("Selection coordinator started");
        loop {
            let selection = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = selections.recv() => match next {
                    Some(selection) => selection,
                    None => break,
                },
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.handle(selection) => {}
            }
        }
        tracing::debug!("Selection coordinator stopped");
    }
}

fn blank_state() -> WeatherScreenState {
    WeatherScreenState::Empty {
        title: String::new(),
        message: String::new(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use std::sync::Arc;

    use super::*;
    use crate::testing::{record, FailingStore, FakeWeather};
    use nimbus_core::WeatherError;
    use nimbus_weather::{KeyValueStore, MemoryPreferences, SqliteWeatherCache, CITY_NAME_KEY};

    fn selected(city: &str) -> CitySelected {
        CitySelected {
            city: city.to_string(),
        }
    }

    fn coordinator(
        remote: Arc<FakeWeather>,
        cache: SqliteWeatherCache,
        store: Arc<dyn KeyValueStore>,
    ) -> SelectionCoordinator {
        SelectionCoordinator::new(
            WeatherRepository::new(remote, Arc::new(cache)),
            CityPreferences::new(store),
        )
    }

    #[tokio::test]
    async fn test_initial_state_is_blank() {
        let c = coordinator(
            Arc::new(FakeWeather::new()),
            SqliteWeatherCache::in_memory().unwrap(),
            Arc::new(MemoryPreferences::new()),
        );
        assert_eq!(
            c.state(),
            WeatherScreenState::Empty {
                title: String::new(),
                message: String::new(),
            }
        );
    }

    #[tokio::test]
    async fn test_selection_saves_city_and_fetches() {
        let remote = Arc::new(FakeWeather::new().with_city("London", Ok(record("London"))));
        let store = Arc::new(MemoryPreferences::new());
        let cache = SqliteWeatherCache::in_memory().unwrap();
        let c = coordinator(remote.clone(), cache.clone(), store.clone());

        c.handle(selected("London")).await;

        assert_eq!(c.state(), WeatherScreenState::Success(record("London")));
        assert_eq!(
            store.get(CITY_NAME_KEY).await.unwrap().as_deref(),
            Some("London")
        );
        assert_eq!(cache.load().unwrap(), Some(record("London")));
        assert_eq!(remote.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_saved_city() {
        let remote = Arc::new(FakeWeather::new().with_city("Atlantis", Err(WeatherError::http(400))));
        let store = Arc::new(MemoryPreferences::new());
        let c = coordinator(remote, SqliteWeatherCache::in_memory().unwrap(), store.clone());

        c.handle(selected("Atlantis")).await;

        assert_eq!(
            c.state(),
            WeatherScreenState::Error("HTTP 400 Bad Request".to_string())
        );
        assert_eq!(
            store.get(CITY_NAME_KEY).await.unwrap().as_deref(),
            Some("Atlantis")
        );
    }

    #[tokio::test]
    async fn test_unsaved_city_skips_fetch() {
        let remote = Arc::new(FakeWeather::new().with_city("London", Ok(record("London"))));
        let c = coordinator(
            remote.clone(),
            SqliteWeatherCache::in_memory().unwrap(),
            Arc::new(FailingStore),
        );

        c.handle(selected("London")).await;

        assert!(
            matches!(c.state(), WeatherScreenState::Error(ref m) if m.starts_with("Weather fetch failed: "))
        );
        assert_eq!(remote.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_city_is_ignored() {
        let remote = Arc::new(FakeWeather::new().with_city("London", Ok(record("London"))));
        let store = Arc::new(MemoryPreferences::new());
        let c = coordinator(remote.clone(), SqliteWeatherCache::in_memory().unwrap(), store.clone());

        c.handle(selected("London")).await;
        c.handle(selected("")).await;
        c.handle(selected("   ")).await;

        assert_eq!(
            c.state(),
            WeatherScreenState::Empty {
                title: String::new(),
                message: String::new(),
            }
        );
        assert_eq!(remote.calls(), 1);
        assert_eq!(
            store.get(CITY_NAME_KEY).await.unwrap().as_deref(),
            Some("London")
        );
    }

    #[tokio::test]
    async fn test_run_processes_selections_until_channel_closes() {
        let remote = Arc::new(
            FakeWeather::new()
                .with_city("London", Ok(record("London")))
                .with_city("Paris", Ok(record("Paris"))),
        );
        let store = Arc::new(MemoryPreferences::new());
        let c = coordinator(remote.clone(), SqliteWeatherCache::in_memory().unwrap(), store.clone());
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(selected("London")).unwrap();
        tx.send(selected("Paris")).unwrap();
        drop(tx);
        c.run(rx, CancellationToken::new()).await;

        assert_eq!(c.state(), WeatherScreenState::Success(record("Paris")));
        assert_eq!(store.get(CITY_NAME_KEY).await.unwrap().as_deref(), Some("Paris"));
        assert_eq!(remote.calls(), 2);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let remote = Arc::new(FakeWeather::new().hanging());
        let c = Arc::new(coordinator(
            remote.clone(),
            SqliteWeatherCache::in_memory().unwrap(),
            Arc::new(MemoryPreferences::new()),
        ));
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let task = tokio::spawn({
            let c = Arc::clone(&c);
            let cancel = cancel.clone();
            async move { c.run(rx, cancel).await }
        });
        tx.send(selected("Lima")).unwrap();
        remote.wait_for_call().await;
        cancel.cancel();
        task.await.unwrap();

        assert_eq!(c.state(), WeatherScreenState::Loading);
    }
}
