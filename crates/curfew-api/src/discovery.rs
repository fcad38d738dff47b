//! Home Assistant MQTT discovery payloads

use serde_json::{Value, json};

use crate::{DISCOVERY_PREFIX, TopicLayout, VERSION};

/// One retained discovery config message
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryMessage {
    pub topic: String,
    pub payload: Value,
}

impl DiscoveryMessage {
    fn new(domain: &str, object_id: String, payload: Value) -> Self {
        Self {
            topic: format!("{}/{}/{}/config", DISCOVERY_PREFIX, domain, object_id),
            payload,
        }
    }
}

fn device_block(layout: &TopicLayout) -> Value {
    json!({
        "identifiers": [layout.discovery_base_id()],
        "name": format!("{} {}", layout.child_id(), layout.device_id()),
        "manufacturer": "curfew",
        "model": "Linux agent",
        "sw_version": VERSION,
    })
}

/// Entities announced for one agent: minutes sensor, activity sensor,
/// permission switch and daily budget number.
pub fn discovery_messages(layout: &TopicLayout) -> Vec<DiscoveryMessage> {
    let base = layout.discovery_base_id();
    let child = layout.child_id();
    let device = device_block(layout);

    vec![
        DiscoveryMessage::new(
            "sensor",
            format!("{}_minutes", base),
            json!({
                "name": format!("{} Minutes", child),
                "unique_id": format!("{}_minutes", base),
                "state_topic": layout.minutes_today(),
                "unit_of_measurement": "min",
                "icon": "mdi:timer-outline",
                "device": device,
            }),
        ),
        DiscoveryMessage::new(
            "binary_sensor",
            format!("{}_active", base),
            json!({
                "name": format!("{} Active", child),
                "unique_id": format!("{}_active", base),
                "state_topic": layout.active(),
                "payload_on": "1",
                "payload_off": "0",
                "device_class": "running",
                "icon": "mdi:laptop",
                "device": device,
            }),
        ),
        DiscoveryMessage::new(
            "switch",
            format!("{}_allowed", base),
            json!({
                "name": format!("{} Allowed", child),
                "unique_id": format!("{}_allowed", base),
                "state_topic": layout.allowed(),
                "command_topic": layout.allowed(),
                "payload_on": "1",
                "payload_off": "0",
                "icon": "mdi:shield-check",
                "device": device,
            }),
        ),
        DiscoveryMessage::new(
            "number",
            format!("{}_daily_budget_minutes", base),
            json!({
                "name": format!("{} Daily Budget (min)", child),
                "unique_id": format!("{}_daily_budget_minutes", base),
                "state_topic": layout.budget(),
                "command_topic": layout.budget(),
                "min": 0,
                "max": 240,
                "step": 5,
                "mode": "box",
                "unit_of_measurement": "min",
                "icon": "mdi:timer-sand",
                "device": device,
            }),
        ),
    ]
}
