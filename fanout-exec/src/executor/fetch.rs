use std::future::Future;

use async_trait::async_trait;
use fanout_core::{FetchError, Key};
use tokio_util::sync::CancellationToken;

/// Performs one unit of work for a key.
///
/// Implementations should check `cancel` before starting new blocking I/O and return promptly
/// once it fires. The engine does not wait for them either way: an in-flight fetch racing a
/// cancelled batch is dropped at its next suspension point, so resources must be released on drop.
#[async_trait]
pub trait FetchExecutor: Send + Sync {
    async fn fetch(&self, key: &Key, cancel: &CancellationToken) -> Result<Vec<u8>, FetchError>;
}

/// Adapts an async closure into a [`FetchExecutor`].
pub struct FnExecutor<F> {
    f: F,
}

impl<F> FnExecutor<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> FetchExecutor for FnExecutor<F>
where
    F: Fn(Key, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<u8>, FetchError>> + Send + 'static,
{
    async fn fetch(&self, key: &Key, cancel: &CancellationToken) -> Result<Vec<u8>, FetchError> {
        (self.f)(key.clone(), cancel.clone()).await
    }
}
