//! Presentation layer for Nimbus: screen states, reducers, view models and
//! the search-to-weather selection coordinator.

pub mod app_services;
pub mod coordinator;
pub mod models;
pub mod reducer;
pub mod state;

#[cfg(test)]
mod testing;

pub use app_services::{Adapters, AppServices};
pub use coordinator::{SelectionCoordinator, WEATHER_FETCH_PREFIX};
pub use models::{SearchViewModel, WeatherViewModel, FETCH_WEATHER_PREFIX, SEARCH_FAILED_PREFIX};
pub use reducer::{
    reduce_search, reduce_weather, CitySelected, SearchReduction, NO_RESULTS_MESSAGE,
    NO_RESULTS_TITLE,
};
pub use state::{SearchScreenState, WeatherScreenState};
