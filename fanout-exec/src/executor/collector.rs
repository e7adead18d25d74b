use fanout_core::{BatchResult, FetchError, Key, Outcome, TaskResult};
use tokio::sync::mpsc;

/// Gathers exactly one [`TaskResult`] per issued [`ResultSlot`].
///
/// The channel is unbounded so a reporting task never waits on the reader, which would otherwise
/// deadlock against the admission gate.
pub struct ResultCollector {
    tx: mpsc::UnboundedSender<TaskResult>,
    rx: mpsc::UnboundedReceiver<TaskResult>,
    expected: usize,
}

impl ResultCollector {
    pub fn new(expected: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, expected }
    }

    /// Reserves the place of one task's result.
    pub fn slot(&self, key: Key) -> ResultSlot {
        ResultSlot {
            key,
            tx: Some(self.tx.clone()),
        }
    }

    /// Waits until every slot has reported (or been dropped) and returns the full collection.
    pub async fn finish(self) -> BatchResult {
        let Self { tx, mut rx, expected } = self;
        drop(tx);
        let mut results = Vec::with_capacity(expected);
        while let Some(result) = rx.recv().await {
            results.push(result);
        }
        BatchResult::from_results(results)
    }
}

/// Write-once handle for a single task's result.
///
/// Reporting consumes the slot. A slot dropped without reporting (a panicking task, a worker
/// torn down mid-queue) records an `Aborted` failure instead, so no key goes missing.
#[derive(Debug)]
pub struct ResultSlot {
    key: Key,
    tx: Option<mpsc::UnboundedSender<TaskResult>>,
}

impl ResultSlot {
    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn report(mut self, outcome: Outcome) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(TaskResult::new(self.key.clone(), outcome));
        }
    }
}

impl Drop for ResultSlot {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(TaskResult::failure(
                self.key.clone(),
                FetchError::Aborted("task ended without reporting".to_string()),
            ));
        }
    }
}
