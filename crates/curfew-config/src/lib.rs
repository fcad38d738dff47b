//! Configuration parsing and validation for curfewd
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Broker connection, topic namespace and device identity
//! - Sampling, idle and offline-grace timings
//! - Validation that reports every problem at once

mod agent;
mod schema;
mod validation;

pub use agent::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Newest `config_version` this build understands
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("config_version {found} is not supported (expected {CURRENT_CONFIG_VERSION})")]
    Version { found: u32 },

    #[error("{} problem(s): {}", errors.len(), join_errors(errors))]
    Invalid { errors: Vec<ValidationError> },
}

fn join_errors(errors: &[ValidationError]) -> String {
    let parts: Vec<String> = errors.iter().map(ToString::to_string).collect();
    parts.join("; ")
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Read `path` and turn it into a validated [`AgentConfig`]
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<AgentConfig> {
    let path = path.as_ref();
    let config = parse_config(&std::fs::read_to_string(path)?)?;
    tracing::debug!(
        path = %path.display(),
        child_id = %config.child_id,
        device_id = %config.device_id,
        "Loaded config"
    );
    Ok(config)
}

/// Same as [`load_config`] for an in-memory document
pub fn parse_config(content: &str) -> ConfigResult<AgentConfig> {
    let raw: RawConfig = toml::from_str(content)?;
    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::Version {
            found: raw.config_version,
        });
    }

    match validate_config(&raw) {
        errors if errors.is_empty() => Ok(AgentConfig::from_raw(raw)),
        errors => Err(ConfigError::Invalid { errors }),
    }
}
