use thiserror::Error;

/// Failure recorded as the outcome of a single task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("cancelled by caller")]
    Cancelled,
    #[error("task aborted before reporting: {0}")]
    Aborted(String),
}

impl FetchError {
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, FetchError::DeadlineExceeded)
    }

    /// Short machine-readable tag, used in JSON output and events.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::DeadlineExceeded => "deadline_exceeded",
            FetchError::Cancelled => "cancelled",
            FetchError::Aborted(_) => "aborted",
        }
    }
}

/// Failure reported by a fetch executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("bad status code: {code}")]
    Status { code: u16 },
    #[error("request timed out")]
    Timeout,
    #[error("connect/dns/tls error: {0}")]
    Network(String),
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("response too large (>{max_bytes} bytes)")]
    ResponseTooLarge { max_bytes: usize },
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("transport error: {0}")]
    Other(String),
}

/// Rejection of a whole batch before any task is spawned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("concurrency limit must be at least 1 (got {0})")]
    InvalidLimit(usize),
    #[error("worker pool needs at least one worker")]
    InvalidWorkerCount,
}
