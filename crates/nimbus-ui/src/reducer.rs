//! Pure folds from orchestrator outcomes into screen states.
//!
//! Reducers never perform side effects. A non-empty search result yields a
//! [`CitySelected`] event that the caller forwards to the
//! [`SelectionCoordinator`](crate::coordinator::SelectionCoordinator).

use nimbus_core::Outcome;
use nimbus_weather::{LocationCandidate, WeatherRecord};

use crate::state::{SearchScreenState, WeatherScreenState};

pub const NO_RESULTS_TITLE: &str = "No Results";
pub const NO_RESULTS_MESSAGE: &str = "No locations found for your search";

/// The first search result was picked; its weather should be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitySelected {
    pub city: String,
}

/// Result of folding one search outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReduction {
    pub state: SearchScreenState,
    pub selection: Option<CitySelected>,
}

pub fn reduce_weather(outcome: Outcome<WeatherRecord>) -> WeatherScreenState {
    match outcome {
        Outcome::Loading => WeatherScreenState::Loading,
        Outcome::Success(record) => WeatherScreenState::Success(record),
        Outcome::Empty { title, message } => WeatherScreenState::Empty { title, message },
        Outcome::Error { message, .. } => WeatherScreenState::Error(message),
    }
}

pub fn reduce_search(outcome: Outcome<Vec<LocationCandidate>>) -> SearchReduction {
    let (state, selection) = match outcome {
        Outcome::Loading => (SearchScreenState::Loading, None),
        Outcome::Success(candidates) if candidates.is_empty() => (
            SearchScreenState::Empty {
                title: NO_RESULTS_TITLE.to_string(),
                message: NO_RESULTS_MESSAGE.to_string(),
            },
            None,
        ),
        Outcome::Success(candidates) => {
            let selection = candidates.first().map(|first| CitySelected {
                city: first.name.clone(),
            });
            (SearchScreenState::Success(candidates), selection)
        }
        Outcome::Empty { title, message } => (SearchScreenState::Empty { title, message }, None),
        Outcome::Error { message, .. } => (SearchScreenState::Error(message), None),
    };

    SearchReduction { state, selection }
}
