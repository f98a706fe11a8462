//! Screen states rendered by the weather and search views.

use nimbus_weather::{LocationCandidate, WeatherRecord};

/// What the weather screen shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WeatherScreenState {
    #[default]
    Loading,
    Success(WeatherRecord),
    Error(String),
    Empty { title: String, message: String },
}

impl WeatherScreenState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// What the search screen shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchScreenState {
    /// No search has been issued yet.
    #[default]
    Idle,
    Loading,
    Success(Vec<LocationCandidate>),
    Error(String),
    Empty { title: String, message: String },
}

impl SearchScreenState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}
