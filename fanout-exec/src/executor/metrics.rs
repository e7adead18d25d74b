use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::executor::events::millis;
use crate::executor::{Event, EventSink};

#[derive(Debug, Clone, Default)]
pub struct BatchMetrics {
    pub batch_id: Option<Uuid>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub total_duration: Option<Duration>,
    pub tasks_total: usize,
    pub tasks_admitted: usize,
    pub tasks_skipped: usize,
    pub tasks_succeeded: usize,
    pub tasks_failed: usize,
    pub tasks_timed_out: usize,
    pub bytes_fetched: usize,
    pub deadline_expired: bool,
}

impl BatchMetrics {
    pub fn start(&mut self, batch_id: Uuid, tasks_total: usize) {
        self.batch_id = Some(batch_id);
        self.tasks_total = tasks_total;
        self.started_at = Some(Instant::now());
    }

    pub fn record_admitted(&mut self) {
        self.tasks_admitted += 1;
    }

    pub fn record_skipped(&mut self) {
        self.tasks_skipped += 1;
    }

    pub fn record_success(&mut self, bytes: usize) {
        self.tasks_succeeded += 1;
        self.bytes_fetched += bytes;
    }

    pub fn record_failure(&mut self, timed_out: bool) {
        self.tasks_failed += 1;
        if timed_out {
            self.tasks_timed_out += 1;
        }
    }

    pub fn record_deadline_expired(&mut self) {
        self.deadline_expired = true;
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
        if let (Some(started), Some(finished)) = (self.started_at, self.finished_at) {
            self.total_duration = Some(finished.duration_since(started));
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "batch_id": self.batch_id.map(|id| id.to_string()),
            "duration_ms": self.total_duration.map(millis),
            "deadline_expired": self.deadline_expired,
            "tasks": {
                "total": self.tasks_total,
                "admitted": self.tasks_admitted,
                "skipped": self.tasks_skipped,
                "succeeded": self.tasks_succeeded,
                "failed": self.tasks_failed,
                "timed_out": self.tasks_timed_out,
            },
            "bytes_fetched": self.bytes_fetched,
        })
    }
}

#[derive(Default)]
pub struct MetricsCollector {
    metrics: Arc<Mutex<BatchMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, event: &Event) {
        let mut metrics = self.metrics.lock().await;
        match event {
            Event::BatchStarted { batch_id, keys, .. } => metrics.start(*batch_id, *keys),
            Event::TaskAdmitted { .. } => metrics.record_admitted(),
            Event::TaskSkipped { .. } => metrics.record_skipped(),
            Event::TaskFinished { bytes, error, .. } => match error {
                None => metrics.record_success(bytes.unwrap_or(0)),
                Some(e) => metrics.record_failure(e.is_deadline_exceeded()),
            },
            Event::DeadlineExpired { .. } => metrics.record_deadline_expired(),
            Event::BatchFinished { .. } => metrics.finish(),
            Event::SingleFetchStarted { .. } | Event::SingleFetchFinished { .. } => {}
        }
    }

    pub async fn get_metrics(&self) -> BatchMetrics {
        self.metrics.lock().await.clone()
    }
}

/// Records every event into a [`MetricsCollector`] before forwarding it.
pub struct MetricsEventSink {
    collector: Arc<MetricsCollector>,
    base: Arc<dyn EventSink>,
}

impl MetricsEventSink {
    pub fn new(collector: Arc<MetricsCollector>, base: Arc<dyn EventSink>) -> Self {
        Self { collector, base }
    }
}

#[async_trait]
impl EventSink for MetricsEventSink {
    async fn emit(&self, event: Event) {
        self.collector.record(&event).await;
        self.base.emit(event).await;
    }
}
