use fanout_core::{BatchResult, BatchSummary, Key, Outcome};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn print_result<T: Serialize>(format: OutputFormat, quiet: bool, result: &T) {
    if quiet {
        return;
    }
    let json = match format {
        OutputFormat::Text => serde_json::to_string_pretty(result),
        OutputFormat::Json => serde_json::to_string(result),
    };
    if let Ok(json) = json {
        println!("{json}");
    }
}

pub fn print_error(format: OutputFormat, quiet: bool, message: &str) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Text => eprintln!("error: {message}"),
        OutputFormat::Json => {
            let err = serde_json::json!({"error": message});
            eprintln!("{}", serde_json::to_string(&err).unwrap_or_default());
        }
    }
}

pub fn print_outcome_text(key: &Key, outcome: &Outcome) {
    match outcome {
        Outcome::Success(bytes) => println!("Fetched {} bytes from {key}", bytes.len()),
        Outcome::Failure(e) => println!("Failed to fetch {key}: {e}"),
    }
}

pub fn print_batch_text(result: &BatchResult) {
    for r in result {
        print_outcome_text(&r.key, &r.outcome);
    }
    print_summary_text(&result.summary());
}

fn print_summary_text(summary: &BatchSummary) {
    println!(
        "{} fetched, {} failed ({} timed out) of {}",
        summary.succeeded, summary.failed, summary.timed_out, summary.total
    );
}
