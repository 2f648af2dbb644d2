//! Tracing setup for the `slots` CLI.
//!
//! Logs go to stderr so stdout stays clean JSON. `RUST_LOG` takes precedence
//! over the `-v` level when set.

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// Single-line output (default)
    #[default]
    Compact,
    /// One JSON object per line
    Json,
}

/// Map the number of `-v` flags to a level: warn, info, debug, trace.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn default_directive(level: Level) -> String {
    format!("slot_engine={0},slot_cli={0}", level.as_str().to_lowercase())
}

/// Install the global subscriber. Call once, before any command runs.
pub fn init(verbosity: u8, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(level_for(verbosity))))
        .context("Failed to build log filter")?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().without_time().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    }
    .context("Failed to install tracing subscriber")
}
