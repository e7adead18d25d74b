mod batch;
mod key;
mod outcome;

pub use batch::{BatchResult, BatchSummary};
pub use key::Key;
pub use outcome::{Outcome, TaskResult};
