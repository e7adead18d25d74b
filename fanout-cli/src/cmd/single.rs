use std::sync::Arc;
use std::time::Duration;

use fanout_core::{Key, Outcome};
use fanout_exec::SingleFetch;
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_error, print_outcome_text, print_result, OutputFormat};
use crate::{AbandonArg, EventsArgs, HttpArgs, OutputArgs};

use super::config::{abandon_policy, build_event_sink, build_http_executor};

#[derive(Serialize)]
struct SingleReport<'a> {
    key: &'a Key,
    budget_ms: u64,
    outcome: &'a Outcome,
}

pub async fn single_cmd(
    key: String,
    budget_ms: u64,
    abandon: AbandonArg,
    output: OutputArgs,
    http: HttpArgs,
    events: EventsArgs,
) -> i32 {
    let executor = match build_http_executor(&http) {
        Ok(x) => x,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let fetch = SingleFetch::new(Arc::new(executor))
        .with_abandon_policy(abandon_policy(abandon))
        .with_event_sink(build_event_sink(&events, None));

    let key = Key::new(key);
    let outcome: Outcome = fetch
        .fetch(key.clone(), Duration::from_millis(budget_ms))
        .await
        .into();

    if !output.quiet {
        match output.format {
            OutputFormat::Text => print_outcome_text(&key, &outcome),
            OutputFormat::Json => print_result(
                OutputFormat::Json,
                false,
                &SingleReport {
                    key: &key,
                    budget_ms,
                    outcome: &outcome,
                },
            ),
        }
    }

    if outcome.is_success() {
        exit_codes::SUCCESS
    } else {
        exit_codes::TASKS_FAILED
    }
}
