//! Raw configuration schema (as parsed from TOML)
//!
//! Numeric fields are signed so that out-of-range values reach validation
//! instead of failing inside the TOML parser.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Child whose usage is tracked (required)
    pub child_id: Option<String>,

    /// Device segment for topics (default: sanitized hostname)
    pub device_id: Option<String>,

    /// Topic prefix (default: `screen/<child_id>`)
    pub topic_prefix: Option<String>,

    /// Broker connection
    #[serde(default)]
    pub mqtt: RawMqttConfig,

    pub sample_interval_seconds: Option<i64>,
    pub idle_timeout_seconds: Option<i64>,

    /// `lock` or `logout`
    pub enforcement_mode: Option<String>,

    /// `safe` or `open`
    pub fail_mode: Option<String>,

    pub offline_grace_period_seconds: Option<i64>,

    /// Local accounts the agent runs for; unset or empty means all
    pub allowed_users: Option<Vec<String>>,

    pub state_path: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub err_log_file: Option<PathBuf>,

    /// Turn on MQTT client debug logging
    #[serde(default)]
    pub debug_transport: bool,
}

/// Broker settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawMqttConfig {
    pub host: Option<String>,
    pub port: Option<i64>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub tls: bool,
}
