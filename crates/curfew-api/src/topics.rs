//! MQTT topic layout
//!
//! Inbound topics live directly under the prefix; per-device outbound
//! topics live under `<prefix>/mac/<device>/`.

use curfew_util::{ChildId, DeviceId};

/// Fixed device-class segment in per-device topics and discovery ids
pub const DEVICE_SEGMENT: &str = "mac";

/// Root of Home Assistant MQTT discovery
pub const DISCOVERY_PREFIX: &str = "homeassistant";

/// Default prefix for a child: `screen/<child_id>`
pub fn default_topic_prefix(child_id: &ChildId) -> String {
    format!("screen/{}", child_id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicLayout {
    prefix: String,
    child_id: ChildId,
    device_id: DeviceId,
}

impl TopicLayout {
    /// `prefix` must already be normalized (no trailing `/`).
    pub fn new(prefix: impl Into<String>, child_id: ChildId, device_id: DeviceId) -> Self {
        Self {
            prefix: prefix.into(),
            child_id,
            device_id,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn child_id(&self) -> &ChildId {
        &self.child_id
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    pub fn allowed(&self) -> String {
        format!("{}/allowed", self.prefix)
    }

    pub fn budget(&self) -> String {
        format!("{}/daily_budget/state", self.prefix)
    }

    fn device_topic(&self, leaf: &str) -> String {
        format!("{}/{}/{}/{}", self.prefix, DEVICE_SEGMENT, self.device_id, leaf)
    }

    pub fn minutes_today(&self) -> String {
        self.device_topic("minutes_today")
    }

    pub fn active(&self) -> String {
        self.device_topic("active")
    }

    pub fn status(&self) -> String {
        self.device_topic("status")
    }

    /// Base for discovery object ids: `<child>_<device>_mac`
    pub fn discovery_base_id(&self) -> String {
        format!("{}_{}_{}", self.child_id, self.device_id, DEVICE_SEGMENT)
    }
}
