use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use fanout_exec::executor::{
    EventSink, MetricsCollector, MetricsEventSink, NoOpEventSink, StdoutEventSink,
    TracingEventSink,
};
use fanout_exec::{
    AbandonPolicy, BatchConfig, DispatchMode, HttpExecutorConfig, HttpFetchExecutor,
    TransportError,
};

use crate::{AbandonArg, ConcurrencyArgs, EventsArgs, EventsKind, HttpArgs, ModeArg};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create http client: {0}")]
    HttpClient(#[from] TransportError),
}

/// Positional keys first, then keys from `file` in file order.
pub fn collect_keys(args: &[String], file: Option<&Path>) -> Result<Vec<String>, ConfigError> {
    let mut keys = args.to_vec();
    if let Some(path) = file {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        keys.extend(parse_keys(&content));
    }
    Ok(keys)
}

/// Accepts a JSON array, a YAML list, or plain lines (blank lines and `#` comments skipped).
pub fn parse_keys(content: &str) -> Vec<String> {
    if let Ok(v) = serde_json::from_str::<Vec<String>>(content) {
        return v;
    }
    if let Ok(v) = serde_yaml::from_str::<Vec<String>>(content) {
        return v;
    }
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

pub fn build_batch_config(concurrency: &ConcurrencyArgs) -> BatchConfig {
    let mode = match concurrency.mode {
        ModeArg::Auto => DispatchMode::Auto,
        ModeArg::PerKey => DispatchMode::PerKey,
        ModeArg::Pool => DispatchMode::Pool {
            workers: concurrency.workers.unwrap_or(concurrency.max_concurrency),
        },
    };
    BatchConfig {
        limit: concurrency.max_concurrency,
        deadline: concurrency.deadline_ms.map(Duration::from_millis),
        mode,
        cancel_grace: Duration::from_millis(concurrency.cancel_grace_ms),
    }
}

pub fn build_http_executor(http: &HttpArgs) -> Result<HttpFetchExecutor, ConfigError> {
    let mut config = HttpExecutorConfig {
        request_timeout: Duration::from_millis(http.request_timeout_ms),
        max_response_bytes: http.max_response_bytes,
        ..Default::default()
    };
    if let Some(ua) = &http.user_agent {
        config.user_agent = ua.clone();
    }
    if http.strict_status {
        config.accept_status = 200..=200;
    }
    Ok(HttpFetchExecutor::new(config)?)
}

pub fn build_event_sink(
    events: &EventsArgs,
    metrics: Option<Arc<MetricsCollector>>,
) -> Arc<dyn EventSink> {
    let base: Arc<dyn EventSink> = match events.events {
        EventsKind::None => Arc::new(NoOpEventSink),
        EventsKind::Stdout => Arc::new(StdoutEventSink),
        EventsKind::Tracing => Arc::new(TracingEventSink),
    };
    match metrics {
        Some(collector) => Arc::new(MetricsEventSink::new(collector, base)),
        None => base,
    }
}

pub fn abandon_policy(arg: AbandonArg) -> AbandonPolicy {
    match arg {
        AbandonArg::Detach => AbandonPolicy::Detach,
        AbandonArg::Abort => AbandonPolicy::Abort,
    }
}
