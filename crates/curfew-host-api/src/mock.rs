//! Mock host adapter and metrics publisher for testing

use async_trait::async_trait;
use curfew_api::StatusReport;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::{
    Enforcer, HostAdapter, HostCapabilities, HostError, HostResult, MetricsPublisher, Notifier,
    PublishError, SessionSensor,
};

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Side effects recorded by [`MockHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostAction {
    Lock,
    Logout,
    Notify { title: String, body: String },
    Speak(String),
}

#[derive(Debug)]
struct MockState {
    idle: Duration,
    locked: bool,
    fail_sensors: bool,
    fail_actions: bool,
    action_delay: Option<Duration>,
    actions: Vec<HostAction>,
}

/// Mock host adapter for unit/integration testing
pub struct MockHost {
    capabilities: HostCapabilities,
    state: Mutex<MockState>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            capabilities: HostCapabilities::full(),
            state: Mutex::new(MockState {
                idle: Duration::ZERO,
                locked: false,
                fail_sensors: false,
                fail_actions: false,
                action_delay: None,
                actions: Vec::new(),
            }),
        }
    }

    pub fn set_idle(&self, idle: Duration) {
        guard(&self.state).idle = idle;
    }

    pub fn set_locked(&self, locked: bool) {
        guard(&self.state).locked = locked;
    }

    /// Make lock-state and idle reads fail
    pub fn set_fail_sensors(&self, fail: bool) {
        guard(&self.state).fail_sensors = fail;
    }

    /// Make every action fail (after being recorded)
    pub fn set_fail_actions(&self, fail: bool) {
        guard(&self.state).fail_actions = fail;
    }

    /// Delay every action, to simulate a hung OS call
    pub fn set_action_delay(&self, delay: Option<Duration>) {
        guard(&self.state).action_delay = delay;
    }

    pub fn actions(&self) -> Vec<HostAction> {
        guard(&self.state).actions.clone()
    }

    pub fn lock_count(&self) -> usize {
        self.count(|a| matches!(a, HostAction::Lock))
    }

    pub fn logout_count(&self) -> usize {
        self.count(|a| matches!(a, HostAction::Logout))
    }

    pub fn spoken(&self) -> Vec<String> {
        guard(&self.state)
            .actions
            .iter()
            .filter_map(|a| match a {
                HostAction::Speak(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&HostAction) -> bool) -> usize {
        guard(&self.state).actions.iter().filter(|a| pred(a)).count()
    }

    async fn act(&self, action: HostAction) -> HostResult<()> {
        let (delay, fail) = {
            let mut state = guard(&self.state);
            state.actions.push(action);
            (state.action_delay, state.fail_actions)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if fail {
            return Err(HostError::CommandFailed {
                command: "mock".into(),
                message: "configured to fail".into(),
            });
        }
        Ok(())
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionSensor for MockHost {
    async fn is_session_locked(&self) -> HostResult<bool> {
        let state = guard(&self.state);
        if state.fail_sensors {
            return Err(HostError::Unsupported("lock state"));
        }
        Ok(state.locked)
    }

    async fn idle_duration(&self) -> HostResult<Duration> {
        let state = guard(&self.state);
        if state.fail_sensors {
            return Err(HostError::Unsupported("idle time"));
        }
        Ok(state.idle)
    }
}

#[async_trait]
impl Enforcer for MockHost {
    async fn lock_session(&self) -> HostResult<()> {
        self.act(HostAction::Lock).await
    }

    async fn logout_session(&self) -> HostResult<()> {
        self.act(HostAction::Logout).await
    }
}

#[async_trait]
impl Notifier for MockHost {
    async fn notify(&self, title: &str, body: &str) -> HostResult<()> {
        self.act(HostAction::Notify {
            title: title.to_string(),
            body: body.to_string(),
        })
        .await
    }

    async fn speak(&self, text: &str) -> HostResult<()> {
        self.act(HostAction::Speak(text.to_string())).await
    }
}

impl HostAdapter for MockHost {
    fn capabilities(&self) -> &HostCapabilities {
        &self.capabilities
    }
}

/// Publications recorded by [`MockPublisher`]
#[derive(Debug, Clone, PartialEq)]
pub enum Publication {
    Minutes(u64),
    Active(bool),
    Status(StatusReport),
}

/// Metrics publisher that records instead of sending
#[derive(Default)]
pub struct MockPublisher {
    published: Mutex<Vec<Publication>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<Publication> {
        guard(&self.published).clone()
    }

    pub fn clear(&self) {
        guard(&self.published).clear();
    }

    fn record(&self, publication: Publication) -> Result<(), PublishError> {
        guard(&self.published).push(publication);
        Ok(())
    }
}

impl MetricsPublisher for MockPublisher {
    fn publish_minutes(&self, minutes: u64) -> Result<(), PublishError> {
        self.record(Publication::Minutes(minutes))
    }

    fn publish_active(&self, active: bool) -> Result<(), PublishError> {
        self.record(Publication::Active(active))
    }

    fn publish_status(&self, report: &StatusReport) -> Result<(), PublishError> {
        self.record(Publication::Status(report.clone()))
    }
}
