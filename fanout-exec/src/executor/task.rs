use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use fanout_core::{FetchError, Key, Outcome};
use futures_util::FutureExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::executor::collector::ResultSlot;
use crate::executor::events::{Event, EventSink};
use crate::executor::fetch::FetchExecutor;
use crate::executor::gate::{Admission, AdmissionGate};
use crate::executor::signal::CancelSignal;

/// Per-batch state shared by every task of that batch.
pub(crate) struct TaskDeps {
    pub batch_id: Uuid,
    pub executor: Arc<dyn FetchExecutor>,
    pub gate: AdmissionGate,
    pub signal: CancelSignal,
    pub event_sink: Arc<dyn EventSink>,
    pub cancel_grace: Duration,
}

pub(crate) type WorkQueue = Arc<Mutex<VecDeque<ResultSlot>>>;

pub(crate) async fn run_task(slot: ResultSlot, deps: &TaskDeps) {
    let key = slot.key().clone();

    let outcome: Outcome = match deps.gate.admit(&deps.signal).await {
        Admission::Admitted(_permit) => {
            emit(deps, Event::TaskAdmitted { batch_id: deps.batch_id, key: key.clone() }).await;
            fetch_admitted(&key, deps).await.into()
        }
        Admission::Cancelled => {
            let reason = deps.signal.error();
            emit(
                deps,
                Event::TaskSkipped {
                    batch_id: deps.batch_id,
                    key: key.clone(),
                    reason: reason.clone(),
                },
            )
            .await;
            Outcome::Failure(reason)
        }
    };

    emit(
        deps,
        Event::TaskFinished {
            batch_id: deps.batch_id,
            key,
            bytes: outcome.payload().map(<[u8]>::len),
            error: outcome.error().cloned(),
        },
    )
    .await;
    slot.report(outcome);
}

/// Pulls slots off the shared queue until it is empty.
///
/// A panic inside one task is contained to that key (its slot reports `Aborted` while
/// unwinding) so the worker keeps draining the queue.
pub(crate) async fn run_worker(queue: WorkQueue, deps: Arc<TaskDeps>) {
    loop {
        let next = queue.lock().await.pop_front();
        let Some(slot) = next else {
            break;
        };
        let _ = AssertUnwindSafe(run_task(slot, &deps)).catch_unwind().await;
    }
}

async fn fetch_admitted(key: &Key, deps: &TaskDeps) -> Result<Vec<u8>, FetchError> {
    let fetch = deps.executor.fetch(key, deps.signal.token());
    tokio::pin!(fetch);

    let result = tokio::select! {
        biased;
        result = &mut fetch => result,
        _ = deps.signal.cancelled() => {
            if deps.cancel_grace.is_zero() {
                return Err(deps.signal.error());
            }
            match tokio::time::timeout(deps.cancel_grace, &mut fetch).await {
                Ok(result) => result,
                Err(_) => return Err(deps.signal.error()),
            }
        }
    };

    // An executor that bailed out on the token does not know why it fired.
    match result {
        Err(FetchError::Cancelled) if deps.signal.is_cancelled() => Err(deps.signal.error()),
        other => other,
    }
}

async fn emit(deps: &TaskDeps, event: Event) {
    deps.event_sink.emit(event).await;
}
