#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use std::path::Path;
use std::process;

use anyhow::Context;
use flowfetch_core::{AttributeExpression, FlowUnit, MemorySession, Relationship};
use flowfetch_object::s3_getter;
use flowfetch_processor::ObjectFetcher;
use tokio::io::AsyncWriteExt;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "flowfetch_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "flowfetch_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "flowfetch_cli::config";
pub const TRACING_TARGET_OUTPUT: &str = "flowfetch_cli::output";

#[tokio::main]
async fn main() {
    let error = match run().await {
        Ok(Relationship::Success) => {
            tracing::info!(
                target: TRACING_TARGET_SHUTDOWN,
                "fetch completed successfully"
            );
            process::exit(0);
        }
        Ok(Relationship::Failure) => {
            tracing::warn!(
                target: TRACING_TARGET_SHUTDOWN,
                "unit routed to failure"
            );
            process::exit(1);
        }
        Err(error) => error,
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Runs one fetch and returns where the unit was routed.
async fn run() -> anyhow::Result<Relationship> {
    let cli = Cli::init();

    telemetry::init_tracing()?;
    cli.log();
    cli.validate()?;

    let remote = s3_getter(cli.s3.clone())
        .await
        .context("failed to create S3 client")?;
    let fetcher =
        ObjectFetcher::new(cli.fetch.clone(), remote).context("failed to create object fetcher")?;

    let unit = cli.unit.build().await?;
    let session = MemorySession::with_units([unit]);

    let relationship = fetcher
        .on_trigger(session.host(&AttributeExpression))
        .await
        .context("no unit was queued")?;

    if let Some((_, unit)) = session.take_routed().into_iter().next() {
        log_attributes(&unit)?;
        if relationship == Relationship::Success {
            write_payload(&unit, cli.output.as_deref()).await?;
        }
    }

    Ok(relationship)
}

/// Logs the unit's attributes as a JSON object.
fn log_attributes(unit: &FlowUnit) -> anyhow::Result<()> {
    let attributes =
        serde_json::to_string(unit.attributes()).context("failed to serialize attributes")?;
    tracing::info!(
        target: TRACING_TARGET_OUTPUT,
        unit_id = %unit.id(),
        attributes = %attributes,
        "unit attributes"
    );
    Ok(())
}

/// Writes the unit's content to `output`, or stdout when absent.
async fn write_payload(unit: &FlowUnit, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => tokio::fs::write(path, unit.content())
            .await
            .with_context(|| format!("failed to write payload to {}", path.display()))?,
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(unit.content())
                .await
                .context("failed to write payload to stdout")?;
            stdout.flush().await.context("failed to flush stdout")?;
        }
    }

    tracing::debug!(
        target: TRACING_TARGET_OUTPUT,
        size = unit.size(),
        output = ?output,
        "payload written"
    );
    Ok(())
}
