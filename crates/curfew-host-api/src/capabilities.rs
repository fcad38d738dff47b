//! Host capabilities model

use serde::{Deserialize, Serialize};

/// Describes what a host adapter can do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCapabilities {
    /// Can read time since last input
    pub can_read_idle: bool,

    /// Can tell whether the screen is locked
    pub can_read_lock_state: bool,

    /// Can lock the screen
    pub can_lock: bool,

    /// Can terminate the user session
    pub can_logout: bool,

    /// Can show desktop notifications
    pub can_notify: bool,

    /// Has a text-to-speech backend
    pub can_speak: bool,
}

impl HostCapabilities {
    /// Nothing available
    pub fn none() -> Self {
        Self {
            can_read_idle: false,
            can_read_lock_state: false,
            can_lock: false,
            can_logout: false,
            can_notify: false,
            can_speak: false,
        }
    }

    /// Everything available (used by the mock host)
    pub fn full() -> Self {
        Self {
            can_read_idle: true,
            can_read_lock_state: true,
            can_lock: true,
            can_logout: true,
            can_notify: true,
            can_speak: true,
        }
    }

    /// Names of missing capabilities, for startup diagnostics
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.can_read_idle {
            missing.push("idle");
        }
        if !self.can_read_lock_state {
            missing.push("lock-state");
        }
        if !self.can_lock {
            missing.push("lock");
        }
        if !self.can_logout {
            missing.push("logout");
        }
        if !self.can_notify {
            missing.push("notify");
        }
        if !self.can_speak {
            missing.push("speech");
        }
        missing
    }
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self::none()
    }
}
