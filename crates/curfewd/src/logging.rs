//! Logging setup: console, a main log file and an error-only log file

use anyhow::{Context, Result};
use curfew_config::AgentConfig;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Directive added when `debug_transport` is enabled
const TRANSPORT_DEBUG_DIRECTIVE: &str = "rumqttc=debug";

fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Build the filter from `RUST_LOG`, falling back to `default_level`
pub fn build_filter(default_level: &str, debug_transport: bool) -> Result<EnvFilter> {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if debug_transport {
        filter = filter.add_directive(
            TRANSPORT_DEBUG_DIRECTIVE
                .parse()
                .context("Invalid transport log directive")?,
        );
    }
    Ok(filter)
}

pub fn init(config: &AgentConfig, default_level: &str) -> Result<()> {
    let log_file = open_append(&config.log_file)?;
    let err_file = open_append(&config.err_log_file)?;

    tracing_subscriber::registry()
        .with(build_filter(default_level, config.debug_transport)?)
        .with(fmt::layer().with_target(true))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(err_file))
                .with_filter(LevelFilter::ERROR),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
