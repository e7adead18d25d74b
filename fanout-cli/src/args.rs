use clap::{Args, ValueEnum};

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ConcurrencyArgs {
    #[arg(long, default_value_t = 5)]
    pub max_concurrency: usize,
    #[arg(long, value_name = "MS")]
    pub deadline_ms: Option<u64>,
    #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
    pub mode: ModeArg,
    /// Worker count for `--mode pool` (defaults to --max-concurrency).
    #[arg(long)]
    pub workers: Option<usize>,
    #[arg(long, value_name = "MS", default_value_t = 0)]
    pub cancel_grace_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Auto,
    PerKey,
    Pool,
}

#[derive(Debug, Args, Clone)]
pub struct HttpArgs {
    #[arg(long, value_name = "MS", default_value_t = 10_000)]
    pub request_timeout_ms: u64,
    #[arg(long, default_value_t = 4_194_304)]
    pub max_response_bytes: usize,
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Treat only `200 OK` as success instead of any 2xx.
    #[arg(long)]
    pub strict_status: bool,
}

#[derive(Debug, Args, Clone)]
pub struct EventsArgs {
    #[arg(long, value_enum, default_value_t = EventsKind::None)]
    pub events: EventsKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventsKind {
    None,
    Stdout,
    Tracing,
}

#[derive(Debug, Args, Clone)]
pub struct LogArgs {
    /// Log filter, e.g. `info` or `fanout.exec=debug`. Falls back to $FANOUT_LOG, then `warn`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AbandonArg {
    Detach,
    Abort,
}
