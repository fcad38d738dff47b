//! Effective permission under unreliable connectivity
//!
//! An explicit signal from the remote authority wins while it is present.
//! In safe mode an explicit signal stops counting once the agent has been
//! offline for the whole grace period; without a usable signal, safe mode
//! blocks and open mode allows.

use curfew_api::{FailMode, PermissionValue};
use curfew_util::MonotonicInstant;
use std::time::Duration;
use tracing::{debug, info};

/// Last permission received from the remote authority
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PermissionSignal {
    pub value: PermissionValue,
    pub retained: bool,
    pub received_at: Option<MonotonicInstant>,
    pub raw_payload: Option<String>,
}

/// Broker connectivity as seen by the transport
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectivityState {
    pub connected: bool,
    /// Start of the current outage; `None` while connected or before the first disconnect
    pub offline_since: Option<MonotonicInstant>,
}

impl ConnectivityState {
    pub fn on_connected(&mut self) {
        self.connected = true;
        self.offline_since = None;
    }

    /// Keeps the start of an outage across repeated notifications
    pub fn on_disconnected(&mut self, now: MonotonicInstant) {
        self.connected = false;
        self.offline_since.get_or_insert(now);
    }

    pub fn offline_for(&self, now: MonotonicInstant) -> Option<Duration> {
        if self.connected {
            return None;
        }
        self.offline_since.map(|since| now.duration_since(since))
    }
}

/// Combine signal, connectivity and fail mode into a single allow/deny bit.
pub fn effective_allowed(
    signal: &PermissionSignal,
    connectivity: &ConnectivityState,
    fail_mode: FailMode,
    offline_grace: Duration,
    now: MonotonicInstant,
) -> bool {
    if let Some(allowed) = signal.value.as_bool() {
        let expired = fail_mode == FailMode::Safe
            && connectivity
                .offline_for(now)
                .is_some_and(|offline| offline >= offline_grace);
        return allowed && !expired;
    }

    match fail_mode {
        FailMode::Open => true,
        FailMode::Safe => false,
    }
}

/// Result of offering a permission delivery to the fail-safe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    Applied { previous: PermissionValue },
    /// First retained block of a connection in open mode
    IgnoredRetained,
}

/// Owns the permission signal and connectivity state
#[derive(Debug, Clone)]
pub struct ConnectivityFailSafe {
    fail_mode: FailMode,
    offline_grace: Duration,
    signal: PermissionSignal,
    connectivity: ConnectivityState,
    ignored_retained_block: bool,
}

impl ConnectivityFailSafe {
    pub fn new(fail_mode: FailMode, offline_grace: Duration) -> Self {
        Self {
            fail_mode,
            offline_grace,
            signal: PermissionSignal::default(),
            connectivity: ConnectivityState::default(),
            ignored_retained_block: false,
        }
    }

    pub fn on_connected(&mut self) {
        self.connectivity.on_connected();
        self.ignored_retained_block = false;
    }

    pub fn on_disconnected(&mut self, now: MonotonicInstant) {
        self.connectivity.on_disconnected(now);
    }

    /// Record a parsed permission delivery.
    ///
    /// In open mode the first retained `blocked` of each connection is
    /// dropped: it is likely stale state from before the agent started.
    pub fn accept(
        &mut self,
        value: PermissionValue,
        retained: bool,
        raw_payload: &str,
        now: MonotonicInstant,
    ) -> SignalOutcome {
        if self.fail_mode == FailMode::Open
            && value == PermissionValue::Blocked
            && retained
            && !self.ignored_retained_block
        {
            self.ignored_retained_block = true;
            info!("Ignoring retained block on connect (fail_mode=open)");
            return SignalOutcome::IgnoredRetained;
        }

        let previous = self.signal.value;
        self.signal = PermissionSignal {
            value,
            retained,
            received_at: Some(now),
            raw_payload: Some(raw_payload.to_string()),
        };
        debug!(?previous, current = ?value, retained, "Permission signal updated");
        SignalOutcome::Applied { previous }
    }

    pub fn effective_allowed(&self, now: MonotonicInstant) -> bool {
        effective_allowed(
            &self.signal,
            &self.connectivity,
            self.fail_mode,
            self.offline_grace,
            now,
        )
    }

    pub fn signal(&self) -> &PermissionSignal {
        &self.signal
    }

    pub fn connectivity(&self) -> &ConnectivityState {
        &self.connectivity
    }

    pub fn is_connected(&self) -> bool {
        self.connectivity.connected
    }
}
