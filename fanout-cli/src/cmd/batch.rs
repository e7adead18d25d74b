use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use fanout_core::{BatchResult, BatchSummary};
use fanout_exec::executor::MetricsCollector;
use fanout_exec::{CancellationToken, Dispatcher};
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_batch_text, print_error, print_result, OutputFormat};
use crate::{ConcurrencyArgs, EventsArgs, HttpArgs, OutputArgs};

use super::config::{build_batch_config, build_event_sink, build_http_executor, collect_keys};

#[derive(Serialize)]
struct BatchReport<'a> {
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    summary: BatchSummary,
    results: &'a BatchResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<serde_json::Value>,
}

#[allow(clippy::too_many_arguments)]
pub async fn batch_cmd(
    keys: &[String],
    file: Option<&Path>,
    output: OutputArgs,
    concurrency: ConcurrencyArgs,
    http: HttpArgs,
    events: EventsArgs,
    with_metrics: bool,
) -> i32 {
    let keys = match collect_keys(keys, file) {
        Ok(k) => k,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::INVALID_INPUT;
        }
    };

    let config = build_batch_config(&concurrency);
    if let Err(e) = config.validate() {
        print_error(output.format, output.quiet, &e.to_string());
        return exit_codes::INVALID_INPUT;
    }

    let executor = match build_http_executor(&http) {
        Ok(x) => x,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let metrics = with_metrics.then(|| Arc::new(MetricsCollector::new()));
    let dispatcher = Dispatcher::new(config, Arc::new(executor))
        .with_event_sink(build_event_sink(&events, metrics.clone()));

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!(target: "fanout.cli", "interrupted; cancelling batch");
                cancel.cancel();
            }
        })
    };

    tracing::info!(target: "fanout.cli", keys = keys.len(), "starting batch");
    let started_at = Utc::now();
    let result = dispatcher.run_with_cancel(keys, &cancel).await;
    interrupt.abort();

    let result = match result {
        Ok(r) => r,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::INVALID_INPUT;
        }
    };

    let metrics = match metrics {
        Some(collector) => Some(collector.get_metrics().await.to_json()),
        None => None,
    };

    if !output.quiet {
        match output.format {
            OutputFormat::Text => {
                print_batch_text(&result);
                if let Some(m) = &metrics {
                    print_result(OutputFormat::Text, false, m);
                }
            }
            OutputFormat::Json => {
                let report = BatchReport {
                    started_at,
                    finished_at: Utc::now(),
                    summary: result.summary(),
                    results: &result,
                    metrics,
                };
                print_result(OutputFormat::Json, false, &report);
            }
        }
    }

    if result.all_succeeded() {
        exit_codes::SUCCESS
    } else {
        exit_codes::TASKS_FAILED
    }
}
