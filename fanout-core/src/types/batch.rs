use serde::Serialize;

use crate::error::FetchError;
use crate::types::{Key, Outcome, TaskResult};

/// Complete, unordered set of outcomes for one batch.
///
/// Element order carries no meaning; only the cardinality (one entry per submitted key) does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BatchResult {
    results: Vec<TaskResult>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
}

impl BatchResult {
    pub fn from_results(results: Vec<TaskResult>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaskResult> {
        self.results.iter()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = (&Key, &[u8])> + '_ {
        self.results.iter().filter_map(|r| match &r.outcome {
            Outcome::Success(bytes) => Some((&r.key, bytes.as_slice())),
            Outcome::Failure(_) => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = (&Key, &FetchError)> + '_ {
        self.results.iter().filter_map(|r| match &r.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure(e) => Some((&r.key, e)),
        })
    }

    /// First outcome recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&Outcome> {
        self.results
            .iter()
            .find(|r| r.key.as_str() == key)
            .map(|r| &r.outcome)
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_success())
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.results.len(),
            ..Default::default()
        };
        for r in &self.results {
            match &r.outcome {
                Outcome::Success(_) => summary.succeeded += 1,
                Outcome::Failure(e) => {
                    summary.failed += 1;
                    if e.is_deadline_exceeded() {
                        summary.timed_out += 1;
                    }
                }
            }
        }
        summary
    }

    pub fn into_vec(self) -> Vec<TaskResult> {
        self.results
    }
}

impl IntoIterator for BatchResult {
    type Item = TaskResult;
    type IntoIter = std::vec::IntoIter<TaskResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a TaskResult;
    type IntoIter = std::slice::Iter<'a, TaskResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl FromIterator<TaskResult> for BatchResult {
    fn from_iter<I: IntoIterator<Item = TaskResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}
