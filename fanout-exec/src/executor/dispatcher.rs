use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use fanout_core::{BatchResult, Key, SubmissionError};
use tokio::sync::Mutex;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::executor::collector::ResultCollector;
use crate::executor::events::{millis, Event, EventSink, NoOpEventSink};
use crate::executor::fetch::FetchExecutor;
use crate::executor::gate::AdmissionGate;
use crate::executor::signal::CancelSignal;
use crate::executor::task::{run_task, run_worker, TaskDeps, WorkQueue};
use crate::executor::types::{BatchConfig, Strategy};

/// Runs batches of keys through a [`FetchExecutor`] under a fixed concurrency budget.
///
/// Every call to [`Dispatcher::run`] builds its own gate, collector and cancellation signal, so
/// concurrent batches on the same dispatcher never interfere.
pub struct Dispatcher {
    config: BatchConfig,
    executor: Arc<dyn FetchExecutor>,
    event_sink: Arc<dyn EventSink>,
}

impl Dispatcher {
    pub fn new(config: BatchConfig, executor: Arc<dyn FetchExecutor>) -> Self {
        Self {
            config,
            executor,
            event_sink: Arc::new(NoOpEventSink),
        }
    }

    pub fn with_event_sink(mut self, event_sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub async fn run<I>(&self, keys: I) -> Result<BatchResult, SubmissionError>
    where
        I: IntoIterator,
        I::Item: Into<Key>,
    {
        self.run_with_cancel(keys, &CancellationToken::new()).await
    }

    /// Like [`Dispatcher::run`], but unfinished tasks are abandoned as `Cancelled` once `parent`
    /// is cancelled.
    pub async fn run_with_cancel<I>(
        &self,
        keys: I,
        parent: &CancellationToken,
    ) -> Result<BatchResult, SubmissionError>
    where
        I: IntoIterator,
        I::Item: Into<Key>,
    {
        self.config.validate()?;
        let keys: Vec<Key> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Ok(BatchResult::default());
        }

        let started = Instant::now();
        let batch_id = Uuid::new_v4();
        let signal = CancelSignal::child_of(parent);

        self.event_sink
            .emit(Event::BatchStarted {
                batch_id,
                keys: keys.len(),
                limit: self.config.limit,
                deadline_ms: self.config.deadline.map(millis),
            })
            .await;

        let deadline_timer = self
            .config
            .deadline
            .and_then(|d| started.checked_add(d))
            .map(|at| self.spawn_deadline_timer(batch_id, signal.clone(), at));

        let deps = Arc::new(TaskDeps {
            batch_id,
            executor: self.executor.clone(),
            gate: AdmissionGate::new(self.config.limit),
            signal,
            event_sink: self.event_sink.clone(),
            cancel_grace: self.config.cancel_grace,
        });

        let collector = ResultCollector::new(keys.len());
        let mut tasks = JoinSet::new();
        match self.config.mode.strategy(keys.len(), self.config.limit) {
            Strategy::PerKey => {
                for key in keys {
                    let slot = collector.slot(key);
                    let deps = deps.clone();
                    tasks.spawn(async move { run_task(slot, &deps).await });
                }
            }
            Strategy::Pool(workers) => {
                let queue: WorkQueue = Arc::new(Mutex::new(
                    keys.into_iter()
                        .map(|key| collector.slot(key))
                        .collect::<VecDeque<_>>(),
                ));
                for _ in 0..workers {
                    tasks.spawn(run_worker(queue.clone(), deps.clone()));
                }
            }
        }

        // A task that panicked has already reported through its dropped slot.
        while tasks.join_next().await.is_some() {}

        if let Some(timer) = deadline_timer {
            if deps.signal.is_expired() {
                // The timer is still delivering `DeadlineExpired`; it must land before `BatchFinished`.
                let _ = timer.await;
            } else {
                timer.abort();
            }
        }
        drop(deps);

        let result = collector.finish().await;
        self.event_sink
            .emit(Event::BatchFinished {
                batch_id,
                summary: result.summary(),
                elapsed_ms: millis(started.elapsed()),
            })
            .await;
        Ok(result)
    }

    fn spawn_deadline_timer(
        &self,
        batch_id: Uuid,
        signal: CancelSignal,
        expires_at: Instant,
    ) -> JoinHandle<()> {
        let event_sink = self.event_sink.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep_until(expires_at) => {
                    signal.expire();
                    event_sink.emit(Event::DeadlineExpired { batch_id }).await;
                }
                _ = signal.cancelled() => {}
            }
        })
    }
}

/// Runs `keys` with at most `limit` concurrent fetches and an optional overall deadline.
pub async fn run_batch<I>(
    keys: I,
    limit: usize,
    deadline: Option<Duration>,
    executor: Arc<dyn FetchExecutor>,
) -> Result<BatchResult, SubmissionError>
where
    I: IntoIterator,
    I::Item: Into<Key>,
{
    let config = BatchConfig {
        limit,
        deadline,
        ..Default::default()
    };
    Dispatcher::new(config, executor).run(keys).await
}
