pub mod collector;
mod dispatcher;
pub mod events;
pub mod fetch;
pub mod gate;
pub mod http;
pub mod metrics;
pub mod signal;
mod single;
mod task;
mod types;

pub use collector::{ResultCollector, ResultSlot};
pub use dispatcher::{run_batch, Dispatcher};
pub use events::{
    CompositeEventSink, Event, EventSink, NoOpEventSink, StdoutEventSink, TracingEventSink,
};
pub use fetch::{FetchExecutor, FnExecutor};
pub use gate::{Admission, AdmissionGate, AdmissionPermit};
pub use http::{HttpExecutorConfig, HttpFetchExecutor};
pub use metrics::{BatchMetrics, MetricsCollector, MetricsEventSink};
pub use signal::CancelSignal;
pub use single::{fetch_with_timeout, SingleFetch};
pub use types::{AbandonPolicy, BatchConfig, DispatchMode, POOL_THRESHOLD};
