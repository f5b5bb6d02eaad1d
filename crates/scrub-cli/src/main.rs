mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout carries the result JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        cli::Commands::Invoke { event } => commands::invoke::handle_event(config_path, &event).await,
        cli::Commands::Run { record, token } => {
            commands::invoke::handle_record(config_path, record, &token).await
        }
        cli::Commands::Serve { host, port } => commands::serve::handle(config_path, host, port).await,
        cli::Commands::Config(cmd) => commands::config::handle(config_path, cmd),
    }
}
