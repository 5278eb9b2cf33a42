//! Logging setup.

use std::io::IsTerminal;

use clap::ValueEnum;
use eyre::{Context, Result};
use strum::AsRefStr;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

/// Setup logging to stderr
///
/// # Arguments
///
/// - `level`: The minimum log level for entries emitted by vessel
/// - `filter`: Additional filter directives for other crates
pub fn setup(level: LoggingLevel, filter: &str) -> Result<()> {
    let directives = format!(
        "{}{}{}",
        level.as_ref(),
        if filter.is_empty() { "" } else { "," },
        filter
    );
    let filter_layer = EnvFilter::builder()
        .parse(&directives)
        .wrap_err_with(|| format!("Unable to parse logging filter: {directives}"))?;

    let format_layer = fmt::layer()
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    registry().with(filter_layer).with(format_layer).init();

    Ok(())
}

/// A `tracing` log level
#[derive(Debug, Copy, Clone, ValueEnum, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum LoggingLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}
