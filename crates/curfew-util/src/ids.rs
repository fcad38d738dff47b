//! Strongly-typed identifiers for curfewd

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the child whose screen time is being enforced
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildId(String);

impl ChildId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChildId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Device segment used in published topics and discovery ids.
///
/// Always lowercase; characters other than alphanumerics, `-` and `_`
/// are replaced with `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    /// Fallback used when the hostname is empty
    pub const FALLBACK: &'static str = "mac";

    pub fn sanitized(raw: &str) -> Self {
        let cleaned: String = raw
            .to_lowercase()
            .chars()
            .map(|ch| {
                if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '-'
                }
            })
            .collect();

        if cleaned.is_empty() {
            Self(Self::FALLBACK.to_string())
        } else {
            Self(cleaned)
        }
    }

    /// Sanitized hostname of this machine
    pub fn from_hostname() -> Self {
        let hostname = nix::unistd::gethostname()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_default();
        Self::sanitized(&hostname)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self::sanitized(&s)
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}
