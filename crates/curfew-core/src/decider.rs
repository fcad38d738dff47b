//! The enforcement decision engine

use chrono::{DateTime, Local};
use curfew_api::{
    ConnectionStatus, EnforcementMode, PermissionValue, StatusReport, VERSION,
    parse_budget_payload,
};
use curfew_config::AgentConfig;
use curfew_store::UsageSnapshot;
use curfew_util::{ChildId, DeviceId, MonotonicInstant, format_timestamp};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{
    BudgetWarningTracker, ConnectivityFailSafe, CoreEvent, EnforcementAction, GraceWindow,
    SignalOutcome, UsageAccumulator,
};

/// Minimum spacing between status heartbeats while connected
pub const STATUS_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(55);

/// Minimum spacing between periodic usage snapshots
pub const USAGE_SAVE_INTERVAL: Duration = Duration::from_secs(30);

/// Derived decider state, for logging and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeciderState {
    Allowed,
    Grace,
    Blocked,
}

/// One periodic observation fed to [`EnforcementDecider::tick`]
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    pub now: MonotonicInstant,
    pub wall: DateTime<Local>,
    /// Time since the previous tick
    pub elapsed: chrono::Duration,
    pub active: bool,
    pub locked: bool,
}

/// Owns all mutable enforcement state.
///
/// Every method takes the current monotonic time and returns the side
/// effects to perform. Handlers for inbound messages never enforce
/// directly; enforcement only comes out of [`tick`](Self::tick).
pub struct EnforcementDecider {
    child_id: ChildId,
    device_id: DeviceId,
    enforcement_mode: EnforcementMode,
    usage: UsageAccumulator,
    failsafe: ConnectivityFailSafe,
    grace: GraceWindow,
    budget: BudgetWarningTracker,
    last_effective: Option<bool>,
    last_minutes_published: Option<u64>,
    last_status_published: Option<MonotonicInstant>,
    last_persisted: MonotonicInstant,
}

impl EnforcementDecider {
    pub fn new(config: &AgentConfig, usage: UsageAccumulator, now: MonotonicInstant) -> Self {
        info!(
            child_id = %config.child_id,
            device_id = %config.device_id,
            enforcement_mode = %config.enforcement_mode,
            fail_mode = %config.fail_mode,
            offline_grace_secs = config.offline_grace_period.as_secs(),
            minutes_today = usage.minutes_today(),
            "Enforcement decider initialized"
        );

        Self {
            child_id: config.child_id.clone(),
            device_id: config.device_id.clone(),
            enforcement_mode: config.enforcement_mode,
            usage,
            failsafe: ConnectivityFailSafe::new(config.fail_mode, config.offline_grace_period),
            grace: GraceWindow::new(config.grace_window),
            budget: BudgetWarningTracker::new(),
            last_effective: None,
            last_minutes_published: None,
            last_status_published: None,
            last_persisted: now,
        }
    }

    /// Connectivity changes only re-decide once an explicit signal exists.
    /// Until then the retained permission usually follows the connect within
    /// milliseconds, and the first unknown-signal decision is left to `tick`.
    pub fn on_connected(&mut self, now: MonotonicInstant) -> Vec<CoreEvent> {
        info!("Connected to broker");
        self.failsafe.on_connected();
        self.reevaluate_if_signalled(now)
    }

    pub fn on_disconnected(&mut self, now: MonotonicInstant) -> Vec<CoreEvent> {
        if self.failsafe.is_connected() {
            warn!("Disconnected from broker");
        }
        self.failsafe.on_disconnected(now);
        self.reevaluate_if_signalled(now)
    }

    fn reevaluate_if_signalled(&mut self, now: MonotonicInstant) -> Vec<CoreEvent> {
        if self.failsafe.signal().value.as_bool().is_none() {
            debug!("No permission signal yet, deferring decision");
            return Vec::new();
        }
        self.reevaluate(now)
    }

    /// Handle a delivery on the permission topic. Malformed payloads are
    /// logged and leave all state untouched.
    pub fn on_permission_payload(
        &mut self,
        payload: &str,
        retained: bool,
        now: MonotonicInstant,
    ) -> Vec<CoreEvent> {
        let value = match PermissionValue::parse_payload(payload) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Ignoring invalid permission payload");
                return Vec::new();
            }
        };

        match self.failsafe.accept(value, retained, payload, now) {
            SignalOutcome::IgnoredRetained => Vec::new(),
            SignalOutcome::Applied { previous } => {
                if previous != value {
                    info!(?value, retained, "Permission updated");
                }
                self.reevaluate(now)
            }
        }
    }

    /// Handle a delivery on the budget topic.
    pub fn on_budget_payload(&mut self, payload: &str) -> Vec<CoreEvent> {
        match parse_budget_payload(payload) {
            Ok(minutes) => {
                let budget_minutes = self.budget.set_budget(minutes);
                vec![CoreEvent::BudgetChanged { budget_minutes }]
            }
            Err(e) => {
                warn!(error = %e, "Ignoring invalid budget payload");
                Vec::new()
            }
        }
    }

    /// Periodic step: account usage, warn, decide, enforce, report.
    pub fn tick(&mut self, input: TickInput) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        let now = input.now;

        let today = input.wall.date_naive();
        if self.usage.roll_over_if_new_day(today) {
            events.push(CoreEvent::DayRolledOver { date: today });
            events.push(CoreEvent::PersistUsage(self.usage.snapshot()));
            self.last_persisted = now;
        }

        self.usage.advance(input.elapsed, input.active);
        let minutes = self.usage.minutes_today();

        if let Some(threshold) = self.budget.check(minutes) {
            info!(
                remaining_minutes = threshold.minutes(),
                minutes_today = minutes,
                "Budget warning"
            );
            events.push(CoreEvent::BudgetWarning(threshold));
        }

        events.extend(self.reevaluate(now));

        let check = self.grace.should_enforce_now(now);
        if check.final_warning {
            events.push(CoreEvent::FinalWarning);
        }
        if check.enforce
            && let Some(action) = self.enforcement_for(input.active, input.locked)
        {
            info!(?action, active = input.active, locked = input.locked, "Enforcing block");
            events.push(CoreEvent::Enforce(action));
        }

        self.push_metrics(&input, minutes, &mut events);

        if now.duration_since(self.last_persisted) >= USAGE_SAVE_INTERVAL {
            events.push(CoreEvent::PersistUsage(self.usage.snapshot()));
            self.last_persisted = now;
        }

        events
    }

    fn enforcement_for(&self, active: bool, locked: bool) -> Option<EnforcementAction> {
        match self.enforcement_mode {
            EnforcementMode::Logout => Some(EnforcementAction::Logout),
            EnforcementMode::Lock if !locked || active => Some(EnforcementAction::Lock),
            EnforcementMode::Lock => None,
        }
    }

    /// Recompute the effective decision and feed it to the grace window.
    fn reevaluate(&mut self, now: MonotonicInstant) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        let allowed = self.failsafe.effective_allowed(now);

        if self.last_effective != Some(allowed) {
            info!(allowed, "Effective permission changed");
            self.last_effective = Some(allowed);
            events.push(CoreEvent::PermissionChanged { allowed });
        }

        if let Some(deadline) = self.grace.on_decision_changed(allowed, now) {
            info!(
                grace_secs = deadline.saturating_duration_until(now).as_secs(),
                "Blocked, grace period started"
            );
            events.push(CoreEvent::GraceStarted { deadline });
        }

        events
    }

    fn push_metrics(&mut self, input: &TickInput, minutes: u64, events: &mut Vec<CoreEvent>) {
        let force = !self.failsafe.is_connected();

        if force || self.last_minutes_published != Some(minutes) {
            events.push(CoreEvent::PublishMinutes(minutes));
            self.last_minutes_published = Some(minutes);
        }

        events.push(CoreEvent::PublishActive(input.active));

        let heartbeat_due = self
            .last_status_published
            .is_none_or(|last| input.now.duration_since(last) >= STATUS_HEARTBEAT_INTERVAL);
        if force || heartbeat_due {
            events.push(CoreEvent::PublishStatus(
                self.status_report(input.now, &input.wall),
            ));
            self.last_status_published = Some(input.now);
        }
    }

    pub fn status_report(&self, now: MonotonicInstant, wall: &DateTime<Local>) -> StatusReport {
        StatusReport {
            status: ConnectionStatus::from_connected(self.failsafe.is_connected()),
            version: VERSION.to_string(),
            child_id: self.child_id.clone(),
            device_id: self.device_id.clone(),
            allowed: self.failsafe.effective_allowed(now),
            minutes_today: self.usage.minutes_today(),
            last_allowed_payload: self.failsafe.signal().raw_payload.clone(),
            timestamp: format_timestamp(wall),
        }
    }

    pub fn state(&self, now: MonotonicInstant) -> DeciderState {
        if self.failsafe.effective_allowed(now) {
            DeciderState::Allowed
        } else if self.grace.is_open() {
            DeciderState::Grace
        } else {
            DeciderState::Blocked
        }
    }

    /// Snapshot for the final flush on shutdown
    pub fn usage_snapshot(&self) -> UsageSnapshot {
        debug!(seconds_today = self.usage.seconds_today(), "Taking usage snapshot");
        self.usage.snapshot()
    }

    pub fn minutes_today(&self) -> u64 {
        self.usage.minutes_today()
    }

    pub fn budget_minutes(&self) -> Option<f64> {
        self.budget.budget_minutes()
    }

    pub fn is_connected(&self) -> bool {
        self.failsafe.is_connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BudgetThreshold;
    use chrono::TimeZone;
    use curfew_api::FailMode;

    const TICK: u64 = 15;

    fn config(fail_mode: FailMode, enforcement_mode: EnforcementMode) -> AgentConfig {
        let mut config = curfew_config::parse_config(
            r#"
            config_version = 1
            child_id = "alice"
            device_id = "den"

            [mqtt]
            host = "broker.lan"
            "#,
        )
        .unwrap();
        config.fail_mode = fail_mode;
        config.enforcement_mode = enforcement_mode;
        config
    }

    struct Harness {
        decider: EnforcementDecider,
        t0: MonotonicInstant,
        wall0: DateTime<Local>,
        secs: u64,
    }

    impl Harness {
        fn new(fail_mode: FailMode, enforcement_mode: EnforcementMode) -> Self {
            let t0 = MonotonicInstant::now();
            let wall0 = Local.with_ymd_and_hms(2025, 12, 25, 10, 0, 0).unwrap();
            let usage = UsageAccumulator::new(wall0.date_naive());
            Self {
                decider: EnforcementDecider::new(
                    &config(fail_mode, enforcement_mode),
                    usage,
                    t0,
                ),
                t0,
                wall0,
                secs: 0,
            }
        }

        fn now(&self) -> MonotonicInstant {
            self.t0 + Duration::from_secs(self.secs)
        }

        fn tick_with(&mut self, active: bool, locked: bool) -> Vec<CoreEvent> {
            self.secs += TICK;
            let input = TickInput {
                now: self.now(),
                wall: self.wall0 + chrono::Duration::seconds(self.secs as i64),
                elapsed: chrono::Duration::seconds(TICK as i64),
                active,
                locked,
            };
            self.decider.tick(input)
        }

        fn tick(&mut self) -> Vec<CoreEvent> {
            self.tick_with(true, false)
        }

        fn connect(&mut self) -> Vec<CoreEvent> {
            let now = self.now();
            self.decider.on_connected(now)
        }

        fn permission(&mut self, payload: &str, retained: bool) -> Vec<CoreEvent> {
            let now = self.now();
            self.decider.on_permission_payload(payload, retained, now)
        }
    }

    fn enforcements(events: &[CoreEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, CoreEvent::Enforce(_)))
            .count()
    }

    fn has(events: &[CoreEvent], pred: impl Fn(&CoreEvent) -> bool) -> bool {
        events.iter().any(pred)
    }

    #[test]
    fn test_open_mode_allows_without_signal() {
        let mut h = Harness::new(FailMode::Open, EnforcementMode::Lock);
        h.connect();
        for _ in 0..20 {
            let events = h.tick();
            assert_eq!(enforcements(&events), 0);
            assert!(!has(&events, |e| matches!(e, CoreEvent::GraceStarted { .. })));
        }
        assert_eq!(h.decider.state(h.now()), DeciderState::Allowed);
    }

    #[test]
    fn test_message_block_goes_through_grace() {
        let mut h = Harness::new(FailMode::Safe, EnforcementMode::Lock);
        h.connect();
        h.permission("1", true);
        h.tick();

        let events = h.permission("0", false);
        assert!(has(&events, |e| matches!(e, CoreEvent::GraceStarted { .. })));
        assert_eq!(enforcements(&events), 0, "messages never enforce");
        assert_eq!(h.decider.state(h.now()), DeciderState::Grace);

        // Window is 60s; ticks at +15, +30, +45 stay inside it and the
        // first of them carries the final warning
        let events = h.tick();
        assert!(has(&events, |e| *e == CoreEvent::FinalWarning));
        assert_eq!(enforcements(&events), 0);
        for _ in 0..2 {
            let events = h.tick();
            assert_eq!(enforcements(&events), 0);
            assert!(!has(&events, |e| *e == CoreEvent::FinalWarning));
        }

        let events = h.tick();
        assert!(!has(&events, |e| *e == CoreEvent::FinalWarning));
        assert!(has(&events, |e| *e == CoreEvent::Enforce(EnforcementAction::Lock)));
        assert_eq!(h.decider.state(h.now()), DeciderState::Blocked);

        // Once locked and idle, no further lock commands
        let events = h.tick_with(false, true);
        assert_eq!(enforcements(&events), 0);
        assert!(!has(&events, |e| *e == CoreEvent::FinalWarning));

        // Unlocked and active again: lock again, no new grace
        let events = h.tick_with(true, false);
        assert_eq!(enforcements(&events), 1);
        assert!(!has(&events, |e| matches!(e, CoreEvent::GraceStarted { .. })));
    }

    #[test]
    fn test_repeated_block_messages_do_not_extend_grace() {
        let mut h = Harness::new(FailMode::Safe, EnforcementMode::Logout);
        h.connect();
        h.permission("1", false);
        h.permission("0", false);

        h.tick();
        h.tick();
        let events = h.permission("0", false);
        assert!(!has(&events, |e| matches!(e, CoreEvent::GraceStarted { .. })));
        h.tick();

        let events = h.tick();
        assert_eq!(
            enforcements(&events),
            1,
            "deadline is 60s after the first block message"
        );
        assert!(has(&events, |e| *e == CoreEvent::Enforce(EnforcementAction::Logout)));
    }

    #[test]
    fn test_allow_during_grace_cancels_enforcement() {
        let mut h = Harness::new(FailMode::Safe, EnforcementMode::Lock);
        h.connect();
        h.permission("0", false);
        h.tick();
        h.tick();

        let events = h.permission("yes", false);
        assert!(has(&events, |e| *e == CoreEvent::PermissionChanged { allowed: true }));

        for _ in 0..10 {
            assert_eq!(enforcements(&h.tick()), 0);
        }
    }

    #[test]
    fn test_safe_mode_connect_waits_for_retained_permission() {
        let mut h = Harness::new(FailMode::Safe, EnforcementMode::Lock);

        assert!(h.connect().is_empty());
        let now = h.now() + Duration::from_millis(20);
        let events = h.decider.on_permission_payload("1", true, now);
        assert_eq!(events, vec![CoreEvent::PermissionChanged { allowed: true }]);

        for _ in 0..8 {
            let events = h.tick();
            assert!(!has(&events, |e| matches!(e, CoreEvent::GraceStarted { .. })));
            assert!(!has(&events, |e| *e == CoreEvent::FinalWarning));
            assert_eq!(enforcements(&events), 0);
        }
        assert_eq!(h.decider.state(h.now()), DeciderState::Allowed);
    }

    #[test]
    fn test_disconnect_before_any_signal_defers_to_tick() {
        let mut h = Harness::new(FailMode::Safe, EnforcementMode::Lock);
        h.connect();
        let now = h.now();
        assert!(h.decider.on_disconnected(now).is_empty());

        let events = h.tick();
        assert!(has(&events, |e| matches!(e, CoreEvent::GraceStarted { .. })));
    }

    #[test]
    fn test_safe_mode_startup_without_signal_blocks_after_grace() {
        let mut h = Harness::new(FailMode::Safe, EnforcementMode::Lock);

        let events = h.tick();
        assert!(has(&events, |e| *e == CoreEvent::PermissionChanged { allowed: false }));
        assert!(has(&events, |e| matches!(e, CoreEvent::GraceStarted { .. })));
        assert!(has(&events, |e| *e == CoreEvent::FinalWarning));
        assert_eq!(enforcements(&events), 0);

        h.tick();
        h.tick();
        h.tick();
        let events = h.tick();
        assert_eq!(enforcements(&events), 1);
    }

    #[test]
    fn test_safe_mode_offline_grace_expiry() {
        let mut h = Harness::new(FailMode::Safe, EnforcementMode::Lock);
        h.connect();
        h.permission("1", true);
        h.tick();

        let disconnected_at = h.now();
        h.decider.on_disconnected(disconnected_at);

        // 180s offline grace: twelve 15s ticks reach exactly 180s
        for _ in 0..11 {
            let events = h.tick();
            assert!(!has(&events, |e| matches!(e, CoreEvent::GraceStarted { .. })));
        }
        assert_eq!(h.decider.state(h.now()), DeciderState::Allowed);

        let events = h.tick();
        assert_eq!(h.now().duration_since(disconnected_at), Duration::from_secs(180));
        assert!(has(&events, |e| *e == CoreEvent::PermissionChanged { allowed: false }));
        assert!(has(&events, |e| matches!(e, CoreEvent::GraceStarted { .. })));
        assert_eq!(enforcements(&events), 0);
    }

    #[test]
    fn test_reconnect_restores_allowed_signal() {
        let mut h = Harness::new(FailMode::Safe, EnforcementMode::Lock);
        h.connect();
        h.permission("1", true);
        let t = h.now();
        h.decider.on_disconnected(t);
        h.secs += 200;
        let events = h.tick();
        assert!(has(&events, |e| matches!(e, CoreEvent::GraceStarted { .. })));

        let events = h.connect();
        assert!(has(&events, |e| *e == CoreEvent::PermissionChanged { allowed: true }));
        assert_eq!(enforcements(&h.tick()), 0);
    }

    #[test]
    fn test_open_mode_retained_block_filter() {
        let mut h = Harness::new(FailMode::Open, EnforcementMode::Lock);
        h.connect();

        assert!(h.permission("0", true).is_empty());
        assert_eq!(h.decider.state(h.now()), DeciderState::Allowed);

        let events = h.permission("0", true);
        assert!(has(&events, |e| matches!(e, CoreEvent::GraceStarted { .. })));
    }

    #[test]
    fn test_malformed_payloads_keep_state() {
        let mut h = Harness::new(FailMode::Safe, EnforcementMode::Lock);
        h.connect();
        h.permission("1", false);
        h.decider.on_budget_payload("30");

        assert!(h.permission("maybe", false).is_empty());
        assert!(h.decider.on_budget_payload("lots").is_empty());
        assert!(h.decider.on_budget_payload("NaN").is_empty());

        assert_eq!(h.decider.state(h.now()), DeciderState::Allowed);
        assert_eq!(h.decider.budget_minutes(), Some(30.0));
    }

    #[test]
    fn test_budget_warnings_from_ticks() {
        let mut h = Harness::new(FailMode::Open, EnforcementMode::Lock);
        h.connect();
        assert_eq!(
            h.decider.on_budget_payload("2"),
            vec![CoreEvent::BudgetChanged { budget_minutes: 2.0 }]
        );

        let mut warnings = Vec::new();
        for _ in 0..12 {
            for event in h.tick() {
                if let CoreEvent::BudgetWarning(threshold) = event {
                    warnings.push((h.decider.minutes_today(), threshold));
                }
            }
        }
        assert_eq!(
            warnings,
            vec![(0, BudgetThreshold::FiveMinutes), (1, BudgetThreshold::OneMinute)]
        );
    }

    #[test]
    fn test_lock_mode_skips_already_locked_idle_session() {
        let mut h = Harness::new(FailMode::Safe, EnforcementMode::Lock);
        h.connect();
        h.permission("0", false);
        let events = h.tick_with(false, true);
        assert!(has(&events, |e| *e == CoreEvent::FinalWarning));
        h.tick_with(false, true);
        h.tick_with(false, true);

        // Deadline reached, but the screen is already locked and idle
        let events = h.tick_with(false, true);
        assert_eq!(enforcements(&events), 0);
        assert_eq!(h.decider.state(h.now()), DeciderState::Blocked);
    }

    #[test]
    fn test_usage_only_counts_active_ticks() {
        let mut h = Harness::new(FailMode::Open, EnforcementMode::Lock);
        for _ in 0..4 {
            h.tick_with(true, false);
        }
        for _ in 0..4 {
            h.tick_with(false, false);
        }
        assert_eq!(h.decider.minutes_today(), 1);
        assert_eq!(h.decider.usage_snapshot().seconds_today, 60.0);
    }

    #[test]
    fn test_metrics_publication_schedule() {
        let mut h = Harness::new(FailMode::Open, EnforcementMode::Lock);
        h.connect();

        let events = h.tick();
        assert!(has(&events, |e| *e == CoreEvent::PublishMinutes(0)));
        assert!(has(&events, |e| *e == CoreEvent::PublishActive(true)));
        assert!(has(&events, |e| matches!(e, CoreEvent::PublishStatus(_))));

        let events = h.tick();
        assert!(!has(&events, |e| matches!(e, CoreEvent::PublishMinutes(_))));
        assert!(has(&events, |e| matches!(e, CoreEvent::PublishActive(_))));
        assert!(!has(&events, |e| matches!(e, CoreEvent::PublishStatus(_))));

        // Minutes reach 1 at 60s
        h.tick();
        let events = h.tick();
        assert!(has(&events, |e| *e == CoreEvent::PublishMinutes(1)));

        // Heartbeat at >= 55s after the first status
        let events = h.tick();
        let status = events.iter().find_map(|e| match e {
            CoreEvent::PublishStatus(report) => Some(report.clone()),
            _ => None,
        });
        let status = status.expect("heartbeat due");
        assert_eq!(status.status, ConnectionStatus::Online);
        assert_eq!(status.minutes_today, 1);
        assert!(status.allowed);
        assert_eq!(status.device_id.as_str(), "den");
    }

    #[test]
    fn test_disconnected_forces_publication() {
        let mut h = Harness::new(FailMode::Open, EnforcementMode::Lock);
        h.tick();
        let events = h.tick();
        assert!(has(&events, |e| matches!(e, CoreEvent::PublishMinutes(_))));
        let status = events.iter().find_map(|e| match e {
            CoreEvent::PublishStatus(report) => Some(report.status),
            _ => None,
        });
        assert_eq!(status, Some(ConnectionStatus::Degraded));
    }

    #[test]
    fn test_periodic_persistence() {
        let mut h = Harness::new(FailMode::Open, EnforcementMode::Lock);
        let persisted = |events: &[CoreEvent]| {
            events
                .iter()
                .filter(|e| matches!(e, CoreEvent::PersistUsage(_)))
                .count()
        };

        assert_eq!(persisted(&h.tick()), 0);
        assert_eq!(persisted(&h.tick()), 1);
        assert_eq!(persisted(&h.tick()), 0);
        assert_eq!(persisted(&h.tick()), 1);
    }

    #[test]
    fn test_day_rollover_resets_and_persists() {
        let mut h = Harness::new(FailMode::Open, EnforcementMode::Lock);
        for _ in 0..8 {
            h.tick();
        }
        assert_eq!(h.decider.minutes_today(), 2);

        // Jump to just after midnight
        h.wall0 = Local.with_ymd_and_hms(2025, 12, 26, 0, 0, 0).unwrap();
        let events = h.tick();
        let next_day = h.wall0.date_naive();
        assert!(has(&events, |e| *e == CoreEvent::DayRolledOver { date: next_day }));
        assert!(has(&events, |e| matches!(
            e,
            CoreEvent::PersistUsage(s) if s.date == next_day && s.seconds_today == 0.0
        )));
        assert_eq!(h.decider.minutes_today(), 0);

        let events = h.tick();
        assert!(!has(&events, |e| matches!(e, CoreEvent::DayRolledOver { .. })));
    }

    #[test]
    fn test_status_report_tracks_last_payload() {
        let mut h = Harness::new(FailMode::Safe, EnforcementMode::Lock);
        h.connect();
        h.permission(" ON ", false);
        let report = h.decider.status_report(h.now(), &h.wall0);
        assert_eq!(report.last_allowed_payload.as_deref(), Some(" ON "));
        assert!(report.allowed);
        assert_eq!(report.child_id.as_str(), "alice");
    }
}
