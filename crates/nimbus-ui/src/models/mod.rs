//! View models that run orchestrator streams into observable state cells.

pub mod search_model;
pub mod weather_model;

pub use search_model::{SearchViewModel, SEARCH_FAILED_PREFIX};
pub use weather_model::{WeatherViewModel, FETCH_WEATHER_PREFIX};

use nimbus_core::Outcome;
use nimbus_weather::OutcomeStream;

/// Hand every emission of `stream` to `apply`.
///
/// Returns `false` when the stream ended without a terminal outcome.
pub(crate) async fn feed<T>(mut stream: OutcomeStream<T>, mut apply: impl FnMut(Outcome<T>)) -> bool {
    while let Some(outcome) = stream.next().await {
        let terminal = outcome.is_terminal();
        apply(outcome);
        if terminal {
            return true;
        }
    }
    false
}

pub(crate) fn stream_closed_message(prefix: &str) -> String {
    format!("{}: outcome stream closed before completion", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_feed_applies_loading_then_terminal() {
        let stream = OutcomeStream::spawn("test", async { Outcome::success(3_u8) });
        let mut seen = Vec::new();

        assert!(feed(stream, |o| seen.push(o)).await);
        assert_eq!(seen, vec![Outcome::Loading, Outcome::success(3)]);
    }

    #[tokio::test]
    async fn test_feed_reports_closed_stream() {
        let (_hold, wait) = tokio::sync::oneshot::channel::<()>();
        let mut stream = OutcomeStream::spawn("test", async move {
            let _ = wait.await;
            Outcome::success(1_u8)
        });
        assert_eq!(stream.next().await, Some(Outcome::Loading));
        stream.cancel();

        let mut seen = Vec::new();
        assert!(!feed(stream, |o| seen.push(o)).await);
        assert!(seen.is_empty());
    }

    #[test]
    fn test_stream_closed_message() {
        assert_eq!(
            stream_closed_message("Search failed"),
            "Search failed: outcome stream closed before completion"
        );
    }
}
