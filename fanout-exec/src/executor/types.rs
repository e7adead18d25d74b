use std::time::Duration;

use fanout_core::SubmissionError;

/// `Auto` switches to a worker pool once a batch holds more than this many keys per slot.
pub const POOL_THRESHOLD: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// One task per key for small batches, a pool of `limit` workers for large ones.
    #[default]
    Auto,
    PerKey,
    Pool { workers: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Strategy {
    PerKey,
    Pool(usize),
}

impl DispatchMode {
    pub(crate) fn strategy(self, keys: usize, limit: usize) -> Strategy {
        match self {
            DispatchMode::PerKey => Strategy::PerKey,
            DispatchMode::Pool { workers } => Strategy::Pool(workers.min(keys.max(1))),
            DispatchMode::Auto => {
                if keys <= limit.saturating_mul(POOL_THRESHOLD) {
                    Strategy::PerKey
                } else {
                    Strategy::Pool(limit)
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub limit: usize,
    pub deadline: Option<Duration>,
    pub mode: DispatchMode,
    /// How long an in-flight fetch may keep running after cancellation before it is abandoned.
    pub cancel_grace: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            deadline: None,
            mode: DispatchMode::Auto,
            cancel_grace: Duration::ZERO,
        }
    }
}

impl BatchConfig {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_cancel_grace(mut self, grace: Duration) -> Self {
        self.cancel_grace = grace;
        self
    }

    pub fn validate(&self) -> Result<(), SubmissionError> {
        if self.limit < 1 {
            return Err(SubmissionError::InvalidLimit(self.limit));
        }
        if let DispatchMode::Pool { workers: 0 } = self.mode {
            return Err(SubmissionError::InvalidWorkerCount);
        }
        Ok(())
    }
}

/// What happens to a single fetch that loses the race against its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbandonPolicy {
    /// Cancel the token and let the task finish on its own; its result is discarded.
    #[default]
    Detach,
    /// Cancel the token and abort the task at its next suspension point.
    Abort,
}
