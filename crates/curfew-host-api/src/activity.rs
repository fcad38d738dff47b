//! Activity sampling on top of a [`SessionSensor`]
//!
//! Read failures bias toward an active, unlocked session so that usage is
//! never silently lost.

use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

use crate::{HostError, HostResult, SessionSensor};

/// One observation of the local session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivitySample {
    /// Input seen within the idle timeout and screen not locked
    pub active: bool,
    pub locked: bool,
    /// `None` when the idle time could not be read
    pub idle: Option<Duration>,
}

async fn read_with_timeout<T>(
    read_timeout: Duration,
    read: impl std::future::Future<Output = HostResult<T>>,
) -> HostResult<T> {
    timeout(read_timeout, read)
        .await
        .map_err(|_| HostError::Timeout(read_timeout))?
}

/// Sample the session, never failing.
pub async fn sample_activity(
    sensor: &dyn SessionSensor,
    idle_timeout: Duration,
    read_timeout: Duration,
) -> ActivitySample {
    let locked = match read_with_timeout(read_timeout, sensor.is_session_locked()).await {
        Ok(locked) => locked,
        Err(e) => {
            warn!(error = %e, "Unable to read lock state; assuming unlocked");
            false
        }
    };

    let idle = match read_with_timeout(read_timeout, sensor.idle_duration()).await {
        Ok(idle) => Some(idle),
        Err(e) => {
            warn!(error = %e, "Unable to read idle time; assuming active");
            None
        }
    };

    let active = match idle {
        None => true,
        Some(idle) if idle > idle_timeout => false,
        Some(_) => !locked,
    };

    ActivitySample {
        active,
        locked,
        idle,
    }
}
