use std::sync::{Arc, OnceLock};

use fanout_core::FetchError;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CancelReason {
    Deadline,
    Caller,
}

/// One-shot broadcast cancellation shared by every task of a batch (or a single fetch).
///
/// Wraps a [`CancellationToken`] and remembers why it fired so unfinished tasks can report
/// `DeadlineExceeded` rather than `Cancelled`.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    token: CancellationToken,
    reason: Arc<OnceLock<CancelReason>>,
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSignal {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            reason: Arc::new(OnceLock::new()),
        }
    }

    /// Signal that fires when `parent` is cancelled, in addition to its own triggers.
    pub fn child_of(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
            reason: Arc::new(OnceLock::new()),
        }
    }

    /// Fires the signal because the deadline was reached.
    pub fn expire(&self) {
        self.fire(CancelReason::Deadline);
    }

    /// Fires the signal on behalf of the caller.
    pub fn cancel(&self) {
        self.fire(CancelReason::Caller);
    }

    fn fire(&self, reason: CancelReason) {
        // First cause wins, including a parent cancellation we only observe through the token.
        if !self.token.is_cancelled() {
            let _ = self.reason.set(reason);
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_expired(&self) -> bool {
        self.reason.get() == Some(&CancelReason::Deadline)
    }

    /// Outcome for a task that was cut short by this signal.
    pub fn error(&self) -> FetchError {
        if self.is_expired() {
            FetchError::DeadlineExceeded
        } else {
            FetchError::Cancelled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expire_reports_deadline_exceeded() {
        let signal = CancelSignal::new();
        assert!(!signal.is_cancelled());
        signal.expire();
        assert!(signal.is_cancelled());
        assert_eq!(signal.error(), FetchError::DeadlineExceeded);
    }

    #[test]
    fn parent_cancellation_reports_cancelled() {
        let parent = CancellationToken::new();
        let signal = CancelSignal::child_of(&parent);
        parent.cancel();
        assert!(signal.is_cancelled());
        signal.expire();
        assert_eq!(signal.error(), FetchError::Cancelled);
    }

    #[test]
    fn first_reason_wins() {
        let signal = CancelSignal::new();
        signal.cancel();
        signal.expire();
        assert_eq!(signal.error(), FetchError::Cancelled);
    }
}
