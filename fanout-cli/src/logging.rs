use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::args::{LogArgs, LogFormat};

const LOG_ENV: &str = "FANOUT_LOG";

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),
    #[error("failed to install log subscriber: {0}")]
    Init(String),
}

/// Installs a stderr subscriber so logs never mix with the report on stdout.
pub fn init(args: &LogArgs) -> Result<(), LogError> {
    let level = args
        .log_level
        .clone()
        .or_else(|| std::env::var(LOG_ENV).ok())
        .unwrap_or_else(|| "warn".to_string());
    let filter = EnvFilter::try_new(&level).map_err(|_| LogError::InvalidFilter(level))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match args.log_format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr).with_ansi(false))
            .try_init(),
    };
    result.map_err(|e| LogError::Init(e.to_string()))
}
