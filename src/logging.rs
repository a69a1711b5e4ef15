// src/logging.rs

//! `tracing` subscriber for the binary.
//!
//! Everything is written to stderr; task stdout is relayed through the
//! same subscriber at `info`. `--log-level` wins over `DAGRUN_LOG`, and
//! `info` is used when neither is set or the variable does not parse.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

const LOG_ENV_VAR: &str = "DAGRUN_LOG";

/// Install the global subscriber. Errors if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_level = std::env::var(LOG_ENV_VAR).ok();
    let level = resolve_level(cli_level, env_level.as_deref());

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

fn resolve_level(cli_level: Option<LogLevel>, env_level: Option<&str>) -> Level {
    if let Some(level) = cli_level {
        return level.into();
    }

    env_level
        .and_then(|raw| raw.trim().parse::<Level>().ok())
        .unwrap_or(Level::INFO)
}
