use anyhow::{Context, Result};
use scrub_config::Config;
use scrub_core::{InvocationEnvelope, InvocationRequest, InvocationResult};
use scrub_engine::Pipeline;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

pub async fn handle_event(config_path: Option<&Path>, event: &str) -> Result<ExitCode> {
    let raw = if event == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read envelope from stdin")?;
        buf
    } else {
        std::fs::read_to_string(event).with_context(|| format!("Failed to read {}", event))?
    };

    let envelope: InvocationEnvelope =
        serde_json::from_str(&raw).context("Envelope is not valid JSON")?;
    run(config_path, &envelope).await
}

pub async fn handle_record(
    config_path: Option<&Path>,
    record: String,
    token: &str,
) -> Result<ExitCode> {
    let request = InvocationRequest {
        skyflow_id: Some(record),
        ..Default::default()
    };
    let envelope = InvocationEnvelope::new(&request, token)?;
    run(config_path, &envelope).await
}

async fn run(config_path: Option<&Path>, envelope: &InvocationEnvelope) -> Result<ExitCode> {
    let config = Config::load(config_path)?;
    let pipeline = Pipeline::from_config(config).context("Failed to create HTTP client")?;

    let result = pipeline.handle(envelope).await;
    print_result(&result)?;

    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_result(result: &InvocationResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}
