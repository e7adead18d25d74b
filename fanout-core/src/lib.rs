#![forbid(unsafe_code)]

//! Data model shared by the fan-out engine and its callers.
//!
//! Nothing in here spawns tasks or touches the network; see `fanout-exec` for the runtime.

pub mod error;
pub mod types;

pub use crate::error::{FetchError, SubmissionError, TransportError};
pub use crate::types::{BatchResult, BatchSummary, Key, Outcome, TaskResult};
