//! hazardd - hazard display daemon
//!
//! Reads inbound hazard envelopes as JSON lines, arbitrates them and writes
//! the resulting display and audio directives to stdout as JSON lines.

#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

use anyhow::{Context, Result};
use clap::Parser;
use hazard_arbiter::HazardArbiter;
use hazard_display_service::{ServiceConfig, Session, feed_lines, render};
use std::path::PathBuf;
use tokio::io::{AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hazardd")]
#[command(about = "Hazard display daemon - arbitrate V2X hazard alerts into display directives")]
#[command(version)]
struct Cli {
    /// Service configuration file (YAML)
    #[arg(short, long, env = "HAZARDD_CONFIG")]
    config: Option<PathBuf>,

    /// Read envelopes from a file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Do not connect the display session at startup
    #[arg(long)]
    no_connect: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries directives; logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("hazardd={log_level},hazard_display_service={log_level},hazard_arbiter={log_level}")
                    .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = match &cli.config {
        Some(path) => ServiceConfig::load(path).await?,
        None => ServiceConfig::default(),
    };
    let catalog = config.load_catalog().await?;
    let arbiter = HazardArbiter::with_flags(config.arbiter.clone(), config.flags)
        .context("Failed to start arbiter")?;

    let (handle, mut dispatches) = Session::spawn(arbiter, config.command_buffer);

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(dispatch) = dispatches.recv().await {
            let mut line = serde_json::to_string(&render(&dispatch, &catalog))
                .context("Failed to serialize dispatch")?;
            line.push('\n');
            stdout
                .write_all(line.as_bytes())
                .await
                .context("Failed to write to stdout")?;
            stdout.flush().await.context("Failed to flush stdout")?;
        }
        anyhow::Ok(())
    });

    if !cli.no_connect {
        handle.connect().await?;
    }

    let forwarded = match &cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open input: {}", path.display()))?;
            feed_lines(BufReader::new(file), &handle).await?
        }
        None => feed_lines(BufReader::new(tokio::io::stdin()), &handle).await?,
    };
    info!(lines = forwarded, "input finished, shutting down");

    handle.shutdown().await?;
    writer.await.context("Output task failed")??;
    Ok(())
}
