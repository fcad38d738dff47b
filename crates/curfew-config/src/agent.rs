//! Validated agent configuration

use curfew_api::{EnforcementMode, FailMode, TopicLayout, default_topic_prefix};
use curfew_util::{
    ChildId, DeviceId, default_err_log_file, default_log_file, default_state_path, expand_tilde,
};
use std::path::PathBuf;
use std::time::Duration;

use crate::schema::{RawConfig, RawMqttConfig};
use crate::validation::normalize_topic_prefix;

pub const DEFAULT_MQTT_PORT: u16 = 1883;
pub const DEFAULT_SAMPLE_INTERVAL_SECS: u64 = 15;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_OFFLINE_GRACE_SECS: u64 = 180;

/// Countdown between a block decision and enforcement
pub const GRACE_WINDOW: Duration = Duration::from_secs(60);

/// Validated configuration ready for use by the daemon
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub child_id: ChildId,
    pub device_id: DeviceId,
    /// Normalized, without trailing `/`
    pub topic_prefix: String,
    pub mqtt: MqttConfig,
    pub sample_interval: Duration,
    pub idle_timeout: Duration,
    pub enforcement_mode: EnforcementMode,
    pub fail_mode: FailMode,
    pub offline_grace_period: Duration,
    pub grace_window: Duration,
    /// `None` means any account may run the agent
    pub allowed_users: Option<Vec<String>>,
    pub state_path: PathBuf,
    pub log_file: PathBuf,
    pub err_log_file: PathBuf,
    pub debug_transport: bool,
}

/// Broker connection settings
#[derive(Clone)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tls: bool,
}

impl std::fmt::Debug for MqttConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("tls", &self.tls)
            .finish()
    }
}

fn seconds(value: Option<i64>, default: u64) -> Duration {
    Duration::from_secs(value.and_then(|v| u64::try_from(v).ok()).unwrap_or(default))
}

fn path_or(value: Option<PathBuf>, default: impl FnOnce() -> PathBuf) -> PathBuf {
    value.map(|p| expand_tilde(&p)).unwrap_or_else(default)
}

impl AgentConfig {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        let child_id = ChildId::new(raw.child_id.as_deref().unwrap_or_default().trim());

        let device_id = raw
            .device_id
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(DeviceId::sanitized)
            .unwrap_or_else(DeviceId::from_hostname);

        let topic_prefix = raw
            .topic_prefix
            .as_deref()
            .map(|p| normalize_topic_prefix(p.trim()).to_string())
            .unwrap_or_else(|| default_topic_prefix(&child_id));

        // Blank entries are dropped; a list that ends up empty allows everyone
        let allowed_users = raw
            .allowed_users
            .map(|users| {
                users
                    .iter()
                    .map(|u| u.trim())
                    .filter(|u| !u.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|users| !users.is_empty());

        Self {
            child_id,
            device_id,
            topic_prefix,
            mqtt: MqttConfig::from_raw(raw.mqtt),
            sample_interval: seconds(raw.sample_interval_seconds, DEFAULT_SAMPLE_INTERVAL_SECS),
            idle_timeout: seconds(raw.idle_timeout_seconds, DEFAULT_IDLE_TIMEOUT_SECS),
            enforcement_mode: raw
                .enforcement_mode
                .and_then(|m| m.parse().ok())
                .unwrap_or_default(),
            fail_mode: raw
                .fail_mode
                .and_then(|m| m.parse().ok())
                .unwrap_or_default(),
            offline_grace_period: seconds(
                raw.offline_grace_period_seconds,
                DEFAULT_OFFLINE_GRACE_SECS,
            ),
            grace_window: GRACE_WINDOW,
            allowed_users,
            state_path: path_or(raw.state_path, default_state_path),
            log_file: path_or(raw.log_file, default_log_file),
            err_log_file: path_or(raw.err_log_file, default_err_log_file),
            debug_transport: raw.debug_transport,
        }
    }

    pub fn topics(&self) -> TopicLayout {
        TopicLayout::new(
            self.topic_prefix.clone(),
            self.child_id.clone(),
            self.device_id.clone(),
        )
    }

    /// Whether the agent should run for the given local account
    pub fn is_user_allowed(&self, user: &str) -> bool {
        match &self.allowed_users {
            Some(users) => users.iter().any(|u| u == user),
            None => true,
        }
    }
}

impl MqttConfig {
    fn from_raw(raw: RawMqttConfig) -> Self {
        Self {
            host: raw.host.unwrap_or_default().trim().to_string(),
            port: raw
                .port
                .and_then(|p| u16::try_from(p).ok())
                .unwrap_or(DEFAULT_MQTT_PORT),
            username: raw.username.filter(|u| !u.is_empty()),
            password: raw.password,
            tls: raw.tls,
        }
    }
}
