//! In-memory fakes shared by the view model tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use nimbus_core::WeatherError;
use nimbus_weather::{
    Condition, CurrentConditions, KeyValueStore, LocationCandidate, LocationInfo, LocationSearch,
    PreferencesError, WeatherRecord, WeatherSource,
};
use tokio::sync::Notify;

pub fn record(name: &str) -> WeatherRecord {
    WeatherRecord {
        location: LocationInfo {
            name: name.to_string(),
            region: String::new(),
            country: "Somewhere".to_string(),
            lat: 10.0,
            lon: 20.0,
        },
        current: CurrentConditions {
            condition: Condition {
                code: 1003,
                text: "Partly cloudy".to_string(),
                icon: "//cdn.weatherapi.com/weather/64x64/day/116.png".to_string(),
            },
            temp_c: 18.5,
            feelslike_c: 17.0,
            humidity: 60,
            uv: 4.0,
        },
    }
}

pub fn candidate(name: &str, country: &str) -> LocationCandidate {
    LocationCandidate {
        name: name.to_string(),
        region: String::new(),
        country: country.to_string(),
        lat: 0.0,
        lon: 0.0,
    }
}

/// Remote weather source answering from a fixed table.
#[derive(Default)]
pub struct FakeWeather {
    responses: HashMap<String, Result<WeatherRecord, WeatherError>>,
    hang: bool,
    calls: AtomicUsize,
    called: Notify,
}

impl FakeWeather {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, city: &str, response: Result<WeatherRecord, WeatherError>) -> Self {
        self.responses.insert(city.to_string(), response);
        self
    }

    /// Never answer.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn wait_for_call(&self) {
        let notified = self.called.notified();
        if self.calls() > 0 {
            return;
        }
        notified.await;
    }
}

#[async_trait]
impl WeatherSource for FakeWeather {
    async fn fetch_weather(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.called.notify_waiters();
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.responses
            .get(city)
            .cloned()
            .unwrap_or_else(|| Err(WeatherError::http(404)))
    }
}

/// Location search answering every query with the same result.
pub struct FakeSearch {
    response: Result<Vec<LocationCandidate>, WeatherError>,
    queries: parking_lot::Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn new(response: Result<Vec<LocationCandidate>, WeatherError>) -> Self {
        Self {
            response,
            queries: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl LocationSearch for FakeSearch {
    async fn search_locations(&self, query: &str) -> Result<Vec<LocationCandidate>, WeatherError> {
        self.queries.lock().push(query.to_string());
        self.response.clone()
    }
}

/// Key-value store whose disk is gone.
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn set(&self, _key: &str, _value: &str) -> Result<(), PreferencesError> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, PreferencesError> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
    }
}
