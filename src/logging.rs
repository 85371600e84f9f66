// src/logging.rs

//! Logging setup for `dagbisect` using `tracing` + `tracing-subscriber`.
//!
//! The filter is chosen in this order:
//! 1. `--log-level` CLI flag, applied to every target
//! 2. `DAGBISECT_LOG`, parsed as `EnvFilter` directives, so both `debug` and
//!    `dagbisect::dag=trace,info` work
//! 3. `info`
//!
//! Logs go to STDERR; stdout is reserved for the local harness report.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

const LOG_ENV_VAR: &str = "DAGBISECT_LOG";

/// Initialise the global logging subscriber. Call once, from `main`.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV_VAR).ok().as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

/// Build the filter from the CLI level and the raw env var value.
pub fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Result<EnvFilter> {
    if let Some(lvl) = cli_level {
        return Ok(EnvFilter::new(level_directive(lvl)));
    }

    match env_value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {LOG_ENV_VAR} value: {directives:?}")),
        None => Ok(EnvFilter::new("info")),
    }
}

fn level_directive(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
