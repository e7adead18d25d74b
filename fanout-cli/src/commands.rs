use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every key under a shared concurrency budget and deadline.
    Batch {
        #[arg(required_unless_present = "file")]
        keys: Vec<String>,
        /// Read keys from a file: a JSON array, a YAML list, or one key per line.
        #[arg(long)]
        file: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        concurrency: ConcurrencyArgs,
        #[command(flatten)]
        http: HttpArgs,
        #[command(flatten)]
        events: EventsArgs,
        /// Include batch metrics in the report.
        #[arg(long)]
        metrics: bool,
    },
    /// Fetch one key, giving up once the budget runs out.
    Single {
        key: String,
        #[arg(long, value_name = "MS", default_value_t = 200)]
        budget_ms: u64,
        #[arg(long, value_enum, default_value_t = AbandonArg::Detach)]
        abandon: AbandonArg,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        http: HttpArgs,
        #[command(flatten)]
        events: EventsArgs,
    },
}
