use std::sync::Arc;
use std::time::Duration;

use fanout_core::{FetchError, Key};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::executor::events::{millis, Event, EventSink, NoOpEventSink};
use crate::executor::fetch::FetchExecutor;
use crate::executor::signal::CancelSignal;
use crate::executor::types::AbandonPolicy;

/// Races one fetch against a time budget, outside of any admission gate.
pub struct SingleFetch {
    executor: Arc<dyn FetchExecutor>,
    abandon: AbandonPolicy,
    event_sink: Arc<dyn EventSink>,
}

impl SingleFetch {
    pub fn new(executor: Arc<dyn FetchExecutor>) -> Self {
        Self {
            executor,
            abandon: AbandonPolicy::default(),
            event_sink: Arc::new(NoOpEventSink),
        }
    }

    pub fn with_abandon_policy(mut self, abandon: AbandonPolicy) -> Self {
        self.abandon = abandon;
        self
    }

    pub fn with_event_sink(mut self, event_sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    /// Returns the executor's result if it arrives within `budget`, `DeadlineExceeded` otherwise.
    ///
    /// The fetch runs as its own task. When the budget wins, its token is cancelled and the
    /// result channel is dropped; the oneshot send never blocks, so a late finisher exits cleanly.
    pub async fn fetch(&self, key: impl Into<Key>, budget: Duration) -> Result<Vec<u8>, FetchError> {
        let key = key.into();
        let fetch_id = Uuid::new_v4();
        let signal = CancelSignal::new();
        let (tx, rx) = oneshot::channel();

        self.event_sink
            .emit(Event::SingleFetchStarted {
                fetch_id,
                key: key.clone(),
                budget_ms: millis(budget),
            })
            .await;

        let handle = {
            let executor = self.executor.clone();
            let token = signal.token().clone();
            let key = key.clone();
            tokio::spawn(async move {
                let result = executor.fetch(&key, &token).await;
                let _ = tx.send(result);
            })
        };

        let result = match tokio::time::timeout(budget, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(FetchError::Aborted(
                "fetch task ended without a result".to_string(),
            )),
            Err(_) => {
                signal.expire();
                if self.abandon == AbandonPolicy::Abort {
                    handle.abort();
                }
                Err(FetchError::DeadlineExceeded)
            }
        };

        self.event_sink
            .emit(Event::SingleFetchFinished {
                fetch_id,
                key,
                error: result.as_ref().err().cloned(),
            })
            .await;
        result
    }
}

/// Fetches `key` with a time budget using the default (detaching) abandon policy.
pub async fn fetch_with_timeout(
    key: impl Into<Key>,
    budget: Duration,
    executor: Arc<dyn FetchExecutor>,
) -> Result<Vec<u8>, FetchError> {
    SingleFetch::new(executor).fetch(key, budget).await
}
