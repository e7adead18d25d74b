use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fanout_exec::executor::{
    CompositeEventSink, Event, EventSink, FetchExecutor, MetricsCollector, MetricsEventSink,
    NoOpEventSink,
};
use fanout_exec::{BatchConfig, CancellationToken, Dispatcher, FetchError, Key, SingleFetch};
use tokio::sync::Mutex;

struct RecordingSink {
    events: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit(&self, event: Event) {
        self.events.lock().await.push(event.type_name().to_string());
    }
}

// Keys starting with "fast" resolve immediately, everything else hangs for 5s.
struct SlowUnlessFast;

#[async_trait]
impl FetchExecutor for SlowUnlessFast {
    async fn fetch(&self, key: &Key, _cancel: &CancellationToken) -> Result<Vec<u8>, FetchError> {
        if key.as_str().starts_with("fast") {
            return Ok(b"ok".to_vec());
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Vec::new())
    }
}

fn slow_unless_fast() -> Arc<SlowUnlessFast> {
    Arc::new(SlowUnlessFast)
}

#[tokio::test]
async fn dispatcher_emits_batch_lifecycle() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::new(RecordingSink { events: events.clone() });
    let dispatcher = Dispatcher::new(BatchConfig::new(2), slow_unless_fast()).with_event_sink(sink);

    dispatcher.run(["fast-1", "fast-2"]).await.unwrap();

    let events = events.lock().await;
    assert_eq!(events.first().map(String::as_str), Some("batch.started"));
    assert_eq!(events.last().map(String::as_str), Some("batch.finished"));
    assert_eq!(events.iter().filter(|e| *e == "task.admitted").count(), 2);
    assert_eq!(events.iter().filter(|e| *e == "task.finished").count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn metrics_count_successes_timeouts_and_skips() {
    let collector = Arc::new(MetricsCollector::new());
    let sink = Arc::new(MetricsEventSink::new(collector.clone(), Arc::new(NoOpEventSink)));
    let dispatcher = Dispatcher::new(
        BatchConfig::new(1).with_deadline(Duration::from_millis(100)),
        slow_unless_fast(),
    )
    .with_event_sink(sink);

    // One slot: the first key holds it past the deadline, the other two never get in.
    let result = dispatcher.run(["slow", "also-slow", "another-slow"]).await.unwrap();
    assert_eq!(result.summary().timed_out, 3);

    let metrics = collector.get_metrics().await;
    assert_eq!(metrics.tasks_total, 3);
    assert_eq!(metrics.tasks_admitted, 1);
    assert_eq!(metrics.tasks_skipped, 2);
    assert_eq!(metrics.tasks_timed_out, 3);
    assert!(metrics.deadline_expired);
    assert!(metrics.total_duration.is_some());

    let json = metrics.to_json();
    assert_eq!(json["tasks"]["skipped"], 2);
    assert_eq!(json["deadline_expired"], true);
}

// Takes its time over the expiry event before passing everything on.
struct SlowOnExpiry {
    inner: Arc<dyn EventSink>,
}

#[async_trait]
impl EventSink for SlowOnExpiry {
    async fn emit(&self, event: Event) {
        if matches!(event, Event::DeadlineExpired { .. }) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.inner.emit(event).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deadline_expired_reaches_a_slow_sink_before_batch_finishes() {
    let collector = Arc::new(MetricsCollector::new());
    let events = Arc::new(Mutex::new(Vec::new()));
    let recorder: Arc<dyn EventSink> = Arc::new(RecordingSink { events: events.clone() });
    let sink = Arc::new(SlowOnExpiry {
        inner: Arc::new(MetricsEventSink::new(collector.clone(), recorder)),
    });
    let dispatcher = Dispatcher::new(
        BatchConfig::new(2).with_deadline(Duration::from_millis(50)),
        slow_unless_fast(),
    )
    .with_event_sink(sink);

    let result = dispatcher.run(["slow-1", "slow-2"]).await.unwrap();
    assert_eq!(result.summary().timed_out, 2);

    let metrics = collector.get_metrics().await;
    assert!(metrics.deadline_expired);

    let events = events.lock().await;
    let expired = events.iter().position(|e| e == "batch.deadline_expired");
    let finished = events.iter().position(|e| e == "batch.finished");
    assert!(expired.is_some());
    assert!(expired < finished);
}

#[tokio::test]
async fn composite_sink_fans_out_to_every_sink() {
    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(Mutex::new(Vec::new()));
    let mut composite = CompositeEventSink::new();
    composite.add(Box::new(RecordingSink { events: first.clone() }));
    composite.add(Box::new(RecordingSink { events: second.clone() }));

    let result = SingleFetch::new(slow_unless_fast())
        .with_event_sink(Arc::new(composite))
        .fetch("fast", Duration::from_secs(1))
        .await;

    assert_eq!(result, Ok(b"ok".to_vec()));
    let expected = vec!["single.started".to_string(), "single.finished".to_string()];
    assert_eq!(*first.lock().await, expected);
    assert_eq!(*second.lock().await, expected);
}

#[test]
fn event_json_carries_type_and_error() {
    let event = Event::TaskFinished {
        batch_id: uuid::Uuid::nil(),
        key: Key::from("https://example.com"),
        bytes: None,
        error: Some(FetchError::DeadlineExceeded),
    };
    let json = event.to_json();
    assert_eq!(json["type"], "task.finished");
    assert_eq!(json["succeeded"], false);
    assert_eq!(json["error"], "deadline exceeded");
}
