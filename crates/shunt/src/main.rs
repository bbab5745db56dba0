//! Shunt - high-throughput pub-sub bridge
//!
//! # Usage
//!
//! ```bash
//! shunt --config configs/example.toml
//! shunt -c bridge.toml -l debug
//! ```
//!
//! Exit code 0 on a clean shutdown; non-zero when the flow failed or the
//! drain exceeded its budget.

mod engine;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shunt_config::{Config, LogFormat};

/// Shunt - high-throughput pub-sub bridge
#[derive(Parser, Debug)]
#[command(name = "shunt")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_file(&cli.config)?;
    let level = cli
        .log_level
        .as_deref()
        .unwrap_or_else(|| config.log.level.as_str());
    init_logging(level, config.log.format)?;
    tracing::info!(config = %cli.config.display(), "configuration loaded");

    let code = engine::run(config).await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {e}"))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Console => registry.with(fmt::layer().with_target(true)).init(),
    }
    Ok(())
}
