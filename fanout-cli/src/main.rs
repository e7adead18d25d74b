use clap::Parser;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod logging;
mod output;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "fanout", version, about = "Fetch many URLs with bounded concurrency and a deadline")]
struct Cli {
    #[command(flatten)]
    log: LogArgs,
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.log) {
        eprintln!("error: {e}");
        std::process::exit(exit_codes::INVALID_INPUT);
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Batch {
            keys,
            file,
            output,
            concurrency,
            http,
            events,
            metrics,
        } => {
            cmd::batch::batch_cmd(
                &keys,
                file.as_deref(),
                output,
                concurrency,
                http,
                events,
                metrics,
            )
            .await
        }
        Command::Single {
            key,
            budget_ms,
            abandon,
            output,
            http,
            events,
        } => cmd::single::single_cmd(key, budget_ms, abandon, output, http, events).await,
    }
}
