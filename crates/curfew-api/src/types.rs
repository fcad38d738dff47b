//! Shared types for the curfewd wire format

use curfew_util::{ChildId, DeviceId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::VERSION;

/// Errors produced while interpreting inbound payloads
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadError {
    #[error("not a boolean-like token: {0:?}")]
    NotBoolean(String),

    #[error("not a number: {0:?}")]
    NotNumeric(String),

    #[error("not a finite number: {0:?}")]
    NotFinite(String),
}

/// Remote permission as last received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionValue {
    Allowed,
    Blocked,
    #[default]
    Unknown,
}

impl PermissionValue {
    /// `None` while nothing explicit has been received
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Allowed => Some(true),
            Self::Blocked => Some(false),
            Self::Unknown => None,
        }
    }

    /// Parse a boolean-like token: `1/true/on/yes` and `0/false/off/no`,
    /// case-insensitive, surrounding whitespace ignored.
    pub fn parse_payload(payload: &str) -> Result<Self, PayloadError> {
        match payload.trim().to_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Ok(Self::Allowed),
            "0" | "false" | "off" | "no" => Ok(Self::Blocked),
            _ => Err(PayloadError::NotBoolean(payload.to_string())),
        }
    }
}

/// Parse a daily budget in (possibly fractional) minutes.
pub fn parse_budget_payload(payload: &str) -> Result<f64, PayloadError> {
    let value: f64 = payload
        .trim()
        .parse()
        .map_err(|_| PayloadError::NotNumeric(payload.to_string()))?;

    if !value.is_finite() {
        return Err(PayloadError::NotFinite(payload.to_string()));
    }

    Ok(value)
}

/// What to do once the grace window elapses while blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementMode {
    #[default]
    Lock,
    Logout,
}

/// Behaviour when no usable explicit permission is available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailMode {
    #[default]
    Safe,
    Open,
}

impl FromStr for EnforcementMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lock" => Ok(Self::Lock),
            "logout" => Ok(Self::Logout),
            other => Err(format!("expected 'lock' or 'logout', got '{}'", other)),
        }
    }
}

impl FromStr for FailMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "safe" => Ok(Self::Safe),
            "open" => Ok(Self::Open),
            other => Err(format!("expected 'safe' or 'open', got '{}'", other)),
        }
    }
}

impl fmt::Display for EnforcementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lock => write!(f, "lock"),
            Self::Logout => write!(f, "logout"),
        }
    }
}

impl fmt::Display for FailMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "safe"),
            Self::Open => write!(f, "open"),
        }
    }
}

/// Broker connectivity as reported in the status topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Online,
    Degraded,
}

impl ConnectionStatus {
    pub fn from_connected(connected: bool) -> Self {
        if connected { Self::Online } else { Self::Degraded }
    }
}

/// Heartbeat published to the status topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: ConnectionStatus,
    pub version: String,
    pub child_id: ChildId,
    pub device_id: DeviceId,
    pub allowed: bool,
    pub minutes_today: u64,
    pub last_allowed_payload: Option<String>,
    pub timestamp: String,
}

impl StatusReport {
    pub fn to_json(&self) -> String {
        // Plain fields only; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Announcement published to the status topic on every successful connect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineEvent {
    pub event: String,
    pub version: String,
}

impl OnlineEvent {
    pub fn new() -> Self {
        Self {
            event: "online".into(),
            version: VERSION.into(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Default for OnlineEvent {
    fn default() -> Self {
        Self::new()
    }
}
