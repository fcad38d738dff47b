//! Configuration validation

use curfew_api::{EnforcementMode, FailMode};
use thiserror::Error;

use crate::agent::{
    DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MQTT_PORT, DEFAULT_OFFLINE_GRACE_SECS,
    DEFAULT_SAMPLE_INTERVAL_SECS,
};
use crate::schema::RawConfig;

/// Validation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("'{0}' is required")]
    MissingField(&'static str),

    #[error("'{field}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("idle_timeout_seconds ({idle}) must be >= sample_interval_seconds ({sample})")]
    IdleTimeoutTooShort { idle: i64, sample: i64 },

    #[error("topic_prefix '{prefix}' must start with '{expected}'")]
    TopicPrefixOutsideChild { prefix: String, expected: String },

    #[error("'{field}': {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

/// Strip trailing slashes from a topic prefix
pub fn normalize_topic_prefix(prefix: &str) -> &str {
    prefix.trim_end_matches('/')
}

fn check_range(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) {
    if value < min || value > max {
        errors.push(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
}

/// Validate a raw configuration, collecting every problem found
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let child_id = config
        .child_id
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    match child_id {
        None => errors.push(ValidationError::MissingField("child_id")),
        Some(child_id) => {
            if let Some(prefix) = &config.topic_prefix {
                let expected = format!("screen/{}", child_id);
                let normalized = normalize_topic_prefix(prefix.trim());
                let namespaced = normalized == expected
                    || normalized.starts_with(&format!("{}/", expected));
                if !namespaced {
                    errors.push(ValidationError::TopicPrefixOutsideChild {
                        prefix: prefix.clone(),
                        expected,
                    });
                }
            }
        }
    }

    if config
        .mqtt
        .host
        .as_deref()
        .is_none_or(|h| h.trim().is_empty())
    {
        errors.push(ValidationError::MissingField("mqtt.host"));
    }

    let port = config.mqtt.port.unwrap_or(DEFAULT_MQTT_PORT as i64);
    check_range(&mut errors, "mqtt.port", port, 1, 65535);

    let sample = config
        .sample_interval_seconds
        .unwrap_or(DEFAULT_SAMPLE_INTERVAL_SECS as i64);
    check_range(&mut errors, "sample_interval_seconds", sample, 5, 60);

    let idle = config
        .idle_timeout_seconds
        .unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS as i64);
    if idle < sample {
        errors.push(ValidationError::IdleTimeoutTooShort { idle, sample });
    }

    let grace = config
        .offline_grace_period_seconds
        .unwrap_or(DEFAULT_OFFLINE_GRACE_SECS as i64);
    check_range(&mut errors, "offline_grace_period_seconds", grace, 0, 900);

    if let Some(mode) = &config.enforcement_mode
        && let Err(message) = mode.parse::<EnforcementMode>()
    {
        errors.push(ValidationError::InvalidValue {
            field: "enforcement_mode",
            message,
        });
    }

    if let Some(mode) = &config.fail_mode
        && let Err(message) = mode.parse::<FailMode>()
    {
        errors.push(ValidationError::InvalidValue {
            field: "fail_mode",
            message,
        });
    }

    errors
}
