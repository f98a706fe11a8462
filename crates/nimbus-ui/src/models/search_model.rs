//! Search screen view model.

use std::sync::Arc;

use nimbus_weather::SearchRepository;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::{feed, stream_closed_message};
use crate::reducer::{reduce_search, CitySelected};
use crate::state::SearchScreenState;

pub const SEARCH_FAILED_PREFIX: &str = "Search failed";

/// Runs location searches and forwards the picked city to the coordinator.
pub struct SearchViewModel {
    repository: SearchRepository,
    selections: mpsc::UnboundedSender<CitySelected>,
    state: Arc<watch::Sender<SearchScreenState>>,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl SearchViewModel {
    pub fn new(
        repository: SearchRepository,
        selections: mpsc::UnboundedSender<CitySelected>,
    ) -> Self {
        Self::with_cancellation(repository, selections, CancellationToken::new())
    }

    pub fn with_cancellation(
        repository: SearchRepository,
        selections: mpsc::UnboundedSender<CitySelected>,
        cancel: CancellationToken,
    ) -> Self {
        let (state, _) = watch::channel(SearchScreenState::default());
        Self {
            repository,
            selections,
            state: Arc::new(state),
            cancel,
            tracker: TaskTracker::new(),
        }
    }

    pub fn state(&self) -> SearchScreenState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchScreenState> {
        self.state.subscribe()
    }

    /// Start a search for `query`. Concurrent searches are not coordinated;
    /// whichever finishes last owns the screen state.
    pub fn search(&self, query: impl Into<String>) -> JoinHandle<()> {
        let query = query.into();
        let repository = self.repository.clone();
        let selections = self.selections.clone();
        let state = Arc::clone(&self.state);
        let cancel = self.cancel.clone();

        self.tracker.spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Search for {:?} cancelled", query);
                }
                _ = run_search(&repository, &query, &selections, &state) => {}
            }
        })
    }

    /// Cancel in-flight searches and wait for them to stop.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}

async fn run_search(
    repository: &SearchRepository,
    query: &str,
    selections: &mpsc::UnboundedSender<CitySelected>,
    state: &watch::Sender<SearchScreenState>,
) {
    tracing::debug!("Searching locations for {:?}", query);
    let completed = feed(repository.search_results(query), |outcome| {
        let reduction = reduce_search(outcome);
        state.send_replace(reduction.state);

        if let Some(selection) = reduction.selection {
            tracing::info!("Selected {}", selection.city);
            if selections.send(selection).is_err() {
                tracing::warn!("Selection dropped: no coordinator is listening");
            }
        }
    })
    .await;

    if !completed {
        state.send_replace(SearchScreenState::Error(stream_closed_message(
            SEARCH_FAILED_PREFIX,
        )));
    }
}
