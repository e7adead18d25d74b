use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use fanout_core::{FetchError, Key, TransportError};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::executor::fetch::FetchExecutor;

#[derive(Debug, Clone)]
pub struct HttpExecutorConfig {
    pub request_timeout: Duration,
    pub max_response_bytes: usize,
    pub user_agent: String,
    /// Status codes treated as success; anything else maps to `TransportError::Status`.
    pub accept_status: RangeInclusive<u16>,
}

impl Default for HttpExecutorConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_response_bytes: 4 * 1024 * 1024, // 4MB
            user_agent: concat!("fanout/", env!("CARGO_PKG_VERSION")).to_string(),
            accept_status: 200..=299,
        }
    }
}

/// GETs each key as a URL and returns the body of a response whose status is accepted.
pub struct HttpFetchExecutor {
    client: reqwest::Client,
    config: HttpExecutorConfig,
}

impl HttpFetchExecutor {
    pub fn new(config: HttpExecutorConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build http client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpExecutorConfig {
        &self.config
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>, TransportError> {
        let mut resp = self.client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = resp.status();
        if !self.config.accept_status.contains(&status.as_u16()) {
            return Err(TransportError::Status { code: status.as_u16() });
        }

        let max_bytes = self.config.max_response_bytes;
        if resp.content_length().is_some_and(|len| len > max_bytes as u64) {
            return Err(TransportError::ResponseTooLarge { max_bytes });
        }

        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(map_body_error)? {
            if body.len() + chunk.len() > max_bytes {
                return Err(TransportError::ResponseTooLarge { max_bytes });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait]
impl FetchExecutor for HttpFetchExecutor {
    async fn fetch(&self, key: &Key, cancel: &CancellationToken) -> Result<Vec<u8>, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        let url = Url::parse(key.as_str())
            .map_err(|e| TransportError::InvalidKey(format!("{key}: {e}")))?;

        tracing::debug!(target: "fanout.exec.http", %url, "fetch");
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(target: "fanout.exec.http", %key, "cancelled; dropping request");
                return Err(FetchError::Cancelled);
            }
            result = self.get(url) => result,
        };

        match &result {
            Ok(body) => tracing::trace!(target: "fanout.exec.http", %key, bytes = body.len(), "fetched"),
            Err(error) => tracing::debug!(target: "fanout.exec.http", %key, %error, "fetch failed"),
        }
        result.map_err(FetchError::from)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        return TransportError::Timeout;
    }
    if e.is_connect() || e.is_request() {
        return TransportError::Network(e.to_string());
    }
    TransportError::Other(e.to_string())
}

fn map_body_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        return TransportError::Timeout;
    }
    TransportError::Body(e.to_string())
}
