//! Two-emission outcome stream.
//!
//! Each orchestrated call spawns one task that pushes `Loading` and then a
//! single terminal outcome into a bounded channel owned by one receiver.
//! Dropping the receiver side aborts the task.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{FutureExt, Stream};
use nimbus_core::{Outcome, WeatherError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// `Loading` plus one terminal outcome.
const OUTCOME_CAPACITY: usize = 2;

/// Outcomes of a single invocation, in emission order.
pub struct OutcomeStream<T> {
    rx: mpsc::Receiver<Outcome<T>>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> OutcomeStream<T> {
    /// Run `policy` on the runtime. `policy` must resolve to a terminal outcome;
    /// a panic inside it is reported as `Outcome::Error`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(operation: &'static str, policy: F) -> Self
    where
        F: Future<Output = Outcome<T>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(OUTCOME_CAPACITY);

        let task = tokio::spawn(async move {
            if tx.send(Outcome::Loading).await.is_err() {
                return;
            }

            let terminal = match AssertUnwindSafe(policy).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!("{} failed unexpectedly: {}", operation, message);
                    Outcome::error(message)
                }
            };
            debug_assert!(terminal.is_terminal());

            if tx.send(terminal).await.is_err() {
                tracing::debug!("{} finished after its receiver was dropped", operation);
            }
        });

        Self { rx, task }
    }
}

impl<T> OutcomeStream<T> {
    /// Next emission, `None` once the invocation is over.
    pub async fn next(&mut self) -> Option<Outcome<T>> {
        self.rx.recv().await
    }

    /// Drain every emission.
    pub async fn collect_all(mut self) -> Vec<Outcome<T>> {
        let mut outcomes = Vec::with_capacity(OUTCOME_CAPACITY);
        while let Some(outcome) = self.rx.recv().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Skip `Loading` and return the terminal outcome, if one arrives.
    pub async fn terminal(mut self) -> Option<Outcome<T>> {
        while let Some(outcome) = self.rx.recv().await {
            if outcome.is_terminal() {
                return Some(outcome);
            }
        }
        None
    }

    /// Abandon the invocation. In-flight adapter calls are dropped.
    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl<T> Drop for OutcomeStream<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl<T> Stream for OutcomeStream<T> {
    type Item = Outcome<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let text = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::new()
    };
    WeatherError::unexpected(text).to_string()
}
