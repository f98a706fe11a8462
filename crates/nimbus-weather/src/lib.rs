//! Weather data layer for Nimbus.
//!
//! Remote weather/search client, single-slot SQLite cache, key-value
//! preferences, and the repositories that orchestrate them into outcome
//! streams.

pub mod cache;
pub mod preferences;
pub mod provider;
pub mod repository;
pub mod source;
pub mod stream;
pub mod types;

pub use cache::SqliteWeatherCache;
pub use preferences::{
    CityPreferences, FilePreferences, KeyValueStore, MemoryPreferences, PreferencesError,
    CITY_NAME_KEY,
};
pub use provider::WeatherApiClient;
pub use repository::{SearchRepository, WeatherRepository, NO_WEATHER_MESSAGE, NO_WEATHER_TITLE};
pub use source::{LocationSearch, WeatherCacheStore, WeatherSource};
pub use stream::OutcomeStream;
pub use types::*;
