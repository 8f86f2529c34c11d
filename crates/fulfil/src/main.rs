mod commands;
mod config;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;

use crate::commands::Commands;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "fulfil")]
#[command(version)]
#[command(about = "Run order fulfillment as a compensating saga", long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); `RUST_LOG` takes precedence
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    if let Err(e) = cli.command.execute() {
        print_error(&e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn print_error(error: &CliError) {
    eprintln!("error: {error}");

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("caused by: {cause}");
        source = std::error::Error::source(cause);
    }
}
