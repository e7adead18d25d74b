use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::executor::signal::CancelSignal;

/// Counting gate enforcing the concurrency budget of one batch.
///
/// Backed by a tokio semaphore, whose FIFO wait queue means no waiter is starved.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    slots: Arc<Semaphore>,
    limit: usize,
}

#[derive(Debug)]
pub enum Admission {
    Admitted(AdmissionPermit),
    Cancelled,
}

/// Holds one slot until dropped.
#[derive(Debug)]
pub struct AdmissionPermit {
    _slot: OwnedSemaphorePermit,
}

impl AdmissionGate {
    pub fn new(limit: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Waits for a free slot unless `signal` fires first.
    ///
    /// A signal that fires while the permit is being granted still wins, so a cancelled task
    /// never reaches the executor.
    pub async fn admit(&self, signal: &CancelSignal) -> Admission {
        if signal.is_cancelled() {
            return Admission::Cancelled;
        }
        let acquired = tokio::select! {
            biased;
            _ = signal.cancelled() => return Admission::Cancelled,
            permit = self.slots.clone().acquire_owned() => permit,
        };
        // The semaphore is owned by this gate and never closed, so `Err` cannot occur.
        match acquired {
            Ok(slot) if !signal.is_cancelled() => Admission::Admitted(AdmissionPermit { _slot: slot }),
            _ => Admission::Cancelled,
        }
    }
}
