//! Trawl CLI - Command-line interface
//!
//! Provides command-line access to the content acquisition pipeline.

mod commands;

use clap::Parser;
use trawl_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "trawl")]
#[command(about = "Catalog scraping and quota-gated content acquisition")]
struct Cli {
    /// Console log verbosity
    #[arg(long, value_enum, default_value = "info")]
    log_level: CliLogLevel,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_level.as_tracing_level(), None) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    commands::handle_command(cli.command).await
}
