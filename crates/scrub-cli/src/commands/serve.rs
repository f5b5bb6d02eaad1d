use anyhow::{Context, Result};
use scrub_config::Config;
use scrub_engine::Pipeline;
use scrub_server::ScrubServer;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

pub async fn handle(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<ExitCode> {
    let config = Config::load(config_path)?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    let pipeline = Pipeline::from_config(config).context("Failed to create HTTP client")?;

    eprintln!("Starting scrub server on {}:{}", host, port);
    ScrubServer::serve(Arc::new(pipeline), &host, port).await?;

    Ok(ExitCode::SUCCESS)
}
