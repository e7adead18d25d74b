use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::FetchError;
use crate::types::Key;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(Vec<u8>),
    Failure(FetchError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Outcome::Success(bytes) => Some(bytes),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<Vec<u8>, FetchError> {
        match self {
            Outcome::Success(bytes) => Ok(bytes),
            Outcome::Failure(e) => Err(e),
        }
    }
}

impl From<Result<Vec<u8>, FetchError>> for Outcome {
    fn from(value: Result<Vec<u8>, FetchError>) -> Self {
        match value {
            Ok(bytes) => Outcome::Success(bytes),
            Err(e) => Outcome::Failure(e),
        }
    }
}

// Payloads are summarized by length; callers that need the bytes read them directly.
impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Success(bytes) => {
                let mut s = serializer.serialize_struct("Outcome", 2)?;
                s.serialize_field("status", "success")?;
                s.serialize_field("bytes", &bytes.len())?;
                s.end()
            }
            Outcome::Failure(e) => {
                let mut s = serializer.serialize_struct("Outcome", 3)?;
                s.serialize_field("status", "failure")?;
                s.serialize_field("kind", e.kind())?;
                s.serialize_field("error", &e.to_string())?;
                s.end()
            }
        }
    }
}

/// One `(key, outcome)` pair of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskResult {
    pub key: Key,
    pub outcome: Outcome,
}

impl TaskResult {
    pub fn new(key: Key, outcome: Outcome) -> Self {
        Self { key, outcome }
    }

    pub fn success(key: Key, payload: Vec<u8>) -> Self {
        Self::new(key, Outcome::Success(payload))
    }

    pub fn failure(key: Key, error: FetchError) -> Self {
        Self::new(key, Outcome::Failure(error))
    }
}
