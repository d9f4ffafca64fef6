//! asterix-relay CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use asterix_relay::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Set up logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    match cli.command {
        Command::Replay {
            file,
            destination,
            max_count,
            source_format,
            time_compression,
        } => {
            cli::replay::run(
                &file,
                &destination,
                max_count,
                source_format.into(),
                time_compression,
            )
            .await
        }
        Command::Proxy {
            group,
            port,
            interface,
            destination,
            max_count,
        } => cli::proxy::run(group, port, interface, &destination, max_count).await,
        Command::Info {
            file,
            source_format,
            no_progress,
        } => cli::info::run(&file, source_format.into(), no_progress).await,
    }
}
