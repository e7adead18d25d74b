#![forbid(unsafe_code)]

//! Runtime engine for bounded fan-out fetch batches.
//!
//! The data model lives in `fanout-core`; this crate owns scheduling, admission, deadlines and
//! result collection, plus a reqwest-backed executor for URL keys.

pub mod executor;

pub use crate::executor::{
    fetch_with_timeout, run_batch, AbandonPolicy, BatchConfig, DispatchMode, Dispatcher,
    FetchExecutor, HttpExecutorConfig, HttpFetchExecutor, SingleFetch,
};
pub use fanout_core::{
    BatchResult, BatchSummary, FetchError, Key, Outcome, SubmissionError, TaskResult,
    TransportError,
};
pub use tokio_util::sync::CancellationToken;
