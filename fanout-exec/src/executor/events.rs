use std::time::Duration;

use async_trait::async_trait;
use fanout_core::{BatchSummary, FetchError, Key};
use futures_util::future::join_all;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum Event {
    BatchStarted {
        batch_id: Uuid,
        keys: usize,
        limit: usize,
        deadline_ms: Option<u64>,
    },
    TaskAdmitted {
        batch_id: Uuid,
        key: Key,
    },
    /// The task never reached the executor.
    TaskSkipped {
        batch_id: Uuid,
        key: Key,
        reason: FetchError,
    },
    TaskFinished {
        batch_id: Uuid,
        key: Key,
        bytes: Option<usize>,
        error: Option<FetchError>,
    },
    DeadlineExpired {
        batch_id: Uuid,
    },
    BatchFinished {
        batch_id: Uuid,
        summary: BatchSummary,
        elapsed_ms: u64,
    },
    SingleFetchStarted {
        fetch_id: Uuid,
        key: Key,
        budget_ms: u64,
    },
    SingleFetchFinished {
        fetch_id: Uuid,
        key: Key,
        error: Option<FetchError>,
    },
}

impl Event {
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::BatchStarted { .. } => "batch.started",
            Event::TaskAdmitted { .. } => "task.admitted",
            Event::TaskSkipped { .. } => "task.skipped",
            Event::TaskFinished { .. } => "task.finished",
            Event::DeadlineExpired { .. } => "batch.deadline_expired",
            Event::BatchFinished { .. } => "batch.finished",
            Event::SingleFetchStarted { .. } => "single.started",
            Event::SingleFetchFinished { .. } => "single.finished",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let ty = self.type_name();
        match self {
            Event::BatchStarted { batch_id, keys, limit, deadline_ms } => {
                json!({ "type": ty, "batch_id": batch_id.to_string(), "keys": keys, "limit": limit, "deadline_ms": deadline_ms })
            }
            Event::TaskAdmitted { batch_id, key } => {
                json!({ "type": ty, "batch_id": batch_id.to_string(), "key": key })
            }
            Event::TaskSkipped { batch_id, key, reason } => {
                json!({ "type": ty, "batch_id": batch_id.to_string(), "key": key, "reason": reason.kind() })
            }
            Event::TaskFinished { batch_id, key, bytes, error } => {
                json!({
                    "type": ty,
                    "batch_id": batch_id.to_string(),
                    "key": key,
                    "succeeded": error.is_none(),
                    "bytes": bytes,
                    "error": error.as_ref().map(|e| e.to_string()),
                })
            }
            Event::DeadlineExpired { batch_id } => {
                json!({ "type": ty, "batch_id": batch_id.to_string() })
            }
            Event::BatchFinished { batch_id, summary, elapsed_ms } => {
                json!({ "type": ty, "batch_id": batch_id.to_string(), "summary": summary, "elapsed_ms": elapsed_ms })
            }
            Event::SingleFetchStarted { fetch_id, key, budget_ms } => {
                json!({ "type": ty, "fetch_id": fetch_id.to_string(), "key": key, "budget_ms": budget_ms })
            }
            Event::SingleFetchFinished { fetch_id, key, error } => {
                json!({
                    "type": ty,
                    "fetch_id": fetch_id.to_string(),
                    "key": key,
                    "succeeded": error.is_none(),
                    "error": error.as_ref().map(|e| e.to_string()),
                })
            }
        }
    }
}

/// Whole milliseconds of `d`, saturating at `u64::MAX`.
pub(crate) fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        join_all(self.sinks.iter().map(|sink| sink.emit(event.clone()))).await;
    }
}

/// Writes one JSON object per event to stdout.
pub struct StdoutEventSink;

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn emit(&self, event: Event) {
        println!("{}", serde_json::to_string(&event.to_json()).unwrap_or_default());
    }
}

/// Forwards events to `tracing` under the `fanout.exec` target.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: Event) {
        let ty = event.type_name();
        match &event {
            Event::DeadlineExpired { batch_id } => {
                tracing::warn!(target: "fanout.exec", %batch_id, "{ty}");
            }
            Event::TaskFinished { batch_id, key, error: Some(error), .. } => {
                tracing::info!(target: "fanout.exec", %batch_id, %key, %error, "{ty}");
            }
            Event::TaskFinished { batch_id, key, bytes, .. } => {
                tracing::debug!(target: "fanout.exec", %batch_id, %key, ?bytes, "{ty}");
            }
            Event::BatchFinished { batch_id, summary, elapsed_ms } => {
                tracing::info!(
                    target: "fanout.exec",
                    %batch_id,
                    total = summary.total,
                    succeeded = summary.succeeded,
                    failed = summary.failed,
                    timed_out = summary.timed_out,
                    elapsed_ms,
                    "{ty}"
                );
            }
            _ => {
                tracing::debug!(target: "fanout.exec", event = %event.to_json(), "{ty}");
            }
        }
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}
