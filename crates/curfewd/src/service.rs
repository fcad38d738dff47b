//! Service event loop and side-effect dispatch

use anyhow::{Context, Result};
use curfew_config::AgentConfig;
use curfew_core::{CoreEvent, EnforcementAction, EnforcementDecider, TickInput, UsageAccumulator};
use curfew_host_api::{HostAdapter, MetricsPublisher, sample_activity};
use curfew_store::{UsageSnapshot, UsageStore};
use curfew_util::{ChildId, MonotonicInstant};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval_at, timeout};
use tracing::{debug, error, info, warn};

use crate::phrases::Phrases;
use crate::transport::{Inbound, MqttTransport};

/// Bound on each lock-state or idle-time read
pub const SENSOR_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound on each enforcement, notification or speech command
pub const ACTION_TIMEOUT: Duration = Duration::from_secs(10);

const TRANSPORT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

/// Turns [`CoreEvent`]s into host actions, publications and writes
pub struct Dispatcher<H> {
    host: Arc<H>,
    publisher: Arc<dyn MetricsPublisher>,
    phrases: &'static Phrases,
    child_id: ChildId,
    persist_tx: watch::Sender<UsageSnapshot>,
    enforcing: Arc<AtomicBool>,
}

impl<H: HostAdapter + 'static> Dispatcher<H> {
    pub fn new(
        host: Arc<H>,
        publisher: Arc<dyn MetricsPublisher>,
        phrases: &'static Phrases,
        child_id: ChildId,
        persist_tx: watch::Sender<UsageSnapshot>,
    ) -> Self {
        Self {
            host,
            publisher,
            phrases,
            child_id,
            persist_tx,
            enforcing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn dispatch_all(&self, events: Vec<CoreEvent>) {
        for event in events {
            self.dispatch(event);
        }
    }

    pub fn dispatch(&self, event: CoreEvent) {
        match event {
            CoreEvent::GraceStarted { .. } => {
                self.alert(Some(self.phrases.grace_body), self.phrases.grace_voice.to_string());
            }

            CoreEvent::FinalWarning => {
                self.alert(None, self.phrases.final_voice(self.child_id.as_str()));
            }

            CoreEvent::BudgetWarning(threshold) => {
                let (body, voice) = match threshold.minutes() {
                    5 => (self.phrases.warn5_body, self.phrases.warn5_voice),
                    _ => (self.phrases.warn1_body, self.phrases.warn1_voice),
                };
                let banner = (!threshold.voice_only()).then_some(body);
                self.alert(banner, voice.to_string());
            }

            CoreEvent::Enforce(action) => self.enforce(action),

            CoreEvent::PublishMinutes(minutes) => {
                if let Err(e) = self.publisher.publish_minutes(minutes) {
                    warn!(error = %e, minutes, "Failed to publish minutes");
                }
            }

            CoreEvent::PublishActive(active) => {
                if let Err(e) = self.publisher.publish_active(active) {
                    debug!(error = %e, active, "Failed to publish activity");
                }
            }

            CoreEvent::PublishStatus(report) => {
                if let Err(e) = self.publisher.publish_status(&report) {
                    debug!(error = %e, "Failed to publish status");
                }
            }

            CoreEvent::PersistUsage(snapshot) => self.persist(snapshot),

            CoreEvent::PermissionChanged { .. }
            | CoreEvent::BudgetChanged { .. }
            | CoreEvent::DayRolledOver { .. } => {
                debug!(?event, "State change");
            }
        }
    }

    pub fn persist(&self, snapshot: UsageSnapshot) {
        if self.persist_tx.send(snapshot).is_err() {
            error!("Usage writer has stopped; snapshot dropped");
        }
    }

    /// Whether an enforcement command is still running
    pub fn is_enforcing(&self) -> bool {
        self.enforcing.load(Ordering::Acquire)
    }

    fn enforce(&self, action: EnforcementAction) {
        if self.enforcing.swap(true, Ordering::AcqRel) {
            debug!(?action, "Enforcement already in flight, retrying next tick");
            return;
        }

        let host = Arc::clone(&self.host);
        let enforcing = Arc::clone(&self.enforcing);
        tokio::spawn(async move {
            let result = match action {
                EnforcementAction::Lock => bounded("lock", host.lock_session()).await,
                EnforcementAction::Logout => bounded("logout", host.logout_session()).await,
            };
            if result {
                info!(?action, "Enforcement applied");
            }
            enforcing.store(false, Ordering::Release);
        });
    }

    /// Banner (optional) followed by speech, on a background task
    fn alert(&self, banner: Option<&'static str>, voice: String) {
        let host = Arc::clone(&self.host);
        let title = self.phrases.title;
        tokio::spawn(async move {
            if let Some(body) = banner {
                bounded("notify", host.notify(title, body)).await;
            }
            bounded("speak", host.speak(&voice)).await;
        });
    }
}

/// Run a host action under [`ACTION_TIMEOUT`], logging failures
async fn bounded<E: std::fmt::Display>(
    what: &'static str,
    action: impl Future<Output = Result<(), E>>,
) -> bool {
    match timeout(ACTION_TIMEOUT, action).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!(action = what, error = %e, "Host action failed");
            false
        }
        Err(_) => {
            warn!(action = what, timeout_secs = ACTION_TIMEOUT.as_secs(), "Host action timed out");
            false
        }
    }
}

/// Writes the latest snapshot on the blocking pool; drains the final value
/// once the sender is dropped.
pub fn spawn_usage_writer(
    store: Arc<dyn UsageStore>,
    mut rx: watch::Receiver<UsageSnapshot>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = *rx.borrow_and_update();
            let was_healthy = store.is_healthy();
            let store = Arc::clone(&store);
            match tokio::task::spawn_blocking(move || store.save_usage(&snapshot)).await {
                Ok(Ok(())) => {
                    if !was_healthy {
                        info!("Usage store writable again");
                    }
                    debug!(
                        date = %snapshot.date,
                        seconds_today = snapshot.seconds_today,
                        "Usage saved"
                    );
                }
                Ok(Err(e)) => warn!(error = %e, "Failed to save usage"),
                Err(e) => error!(error = %e, "Usage writer task failed"),
            }
        }
        debug!("Usage writer stopped");
    })
}

/// Main service state
pub struct Service<H> {
    config: AgentConfig,
    decider: EnforcementDecider,
    host: Arc<H>,
    dispatcher: Dispatcher<H>,
    transport: Arc<MqttTransport>,
    transport_task: JoinHandle<()>,
    inbound_rx: mpsc::UnboundedReceiver<Inbound>,
    writer: JoinHandle<()>,
}

impl<H: HostAdapter + 'static> Service<H> {
    pub fn new(
        config: AgentConfig,
        host: Arc<H>,
        store: Arc<dyn UsageStore>,
        phrases: &'static Phrases,
    ) -> Result<Self> {
        let today = curfew_util::today();
        let saved = match store.load_usage() {
            Ok(saved) => saved,
            Err(e) => {
                warn!(error = %e, "Could not read saved usage, starting from zero");
                None
            }
        };
        let usage = UsageAccumulator::from_snapshot(saved, today);
        info!(
            date = %usage.date(),
            minutes_today = usage.minutes_today(),
            "Usage loaded"
        );

        let (persist_tx, persist_rx) = watch::channel(usage.snapshot());
        let writer = spawn_usage_writer(store, persist_rx);

        let decider = EnforcementDecider::new(&config, usage, MonotonicInstant::now());

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (transport, transport_task) = MqttTransport::start(&config, inbound_tx);
        let transport = Arc::new(transport);

        let dispatcher = Dispatcher::new(
            Arc::clone(&host),
            transport.clone(),
            phrases,
            config.child_id.clone(),
            persist_tx,
        );

        Ok(Self {
            config,
            decider,
            host,
            dispatcher,
            transport,
            transport_task,
            inbound_rx,
            writer,
        })
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            config,
            mut decider,
            host,
            dispatcher,
            transport,
            mut transport_task,
            mut inbound_rx,
            writer,
        } = self;

        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
        let mut sighup =
            signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

        // First tick after one period, so a retained permission can arrive first
        let period = config.sample_interval;
        let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = MonotonicInstant::now();

        info!(sample_interval_secs = period.as_secs(), "Service running");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }
                _ = sighup.recv() => {
                    info!("Received SIGHUP, shutting down gracefully");
                    break;
                }

                _ = ticker.tick() => {
                    let sample =
                        sample_activity(host.as_ref(), config.idle_timeout, SENSOR_TIMEOUT).await;
                    let now = MonotonicInstant::now();
                    let elapsed = chrono::Duration::from_std(now.duration_since(last_tick))
                        .unwrap_or_else(|_| chrono::Duration::zero());
                    last_tick = now;

                    debug!(
                        active = sample.active,
                        locked = sample.locked,
                        idle_secs = sample.idle.map(|d| d.as_secs()),
                        "Tick"
                    );

                    let events = decider.tick(TickInput {
                        now,
                        wall: curfew_util::now(),
                        elapsed,
                        active: sample.active,
                        locked: sample.locked,
                    });
                    dispatcher.dispatch_all(events);
                }

                Some(inbound) = inbound_rx.recv() => {
                    let now = MonotonicInstant::now();
                    let events = match inbound {
                        Inbound::Connected => decider.on_connected(now),
                        Inbound::Disconnected => decider.on_disconnected(now),
                        Inbound::Permission { payload, retained } => {
                            decider.on_permission_payload(&payload, retained, now)
                        }
                        Inbound::Budget { payload } => decider.on_budget_payload(&payload),
                    };
                    dispatcher.dispatch_all(events);
                }
            }
        }

        info!("Shutting down curfewd");

        dispatcher.persist(decider.usage_snapshot());
        drop(dispatcher);
        if let Err(e) = writer.await {
            error!(error = %e, "Usage writer did not finish cleanly");
        }

        transport.disconnect().await;
        if timeout(TRANSPORT_SHUTDOWN_TIMEOUT, &mut transport_task)
            .await
            .is_err()
        {
            warn!("MQTT event loop did not stop in time");
            transport_task.abort();
        }

        info!("Shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phrases::Language;
    use chrono::NaiveDate;
    use curfew_api::{ConnectionStatus, StatusReport};
    use curfew_core::BudgetThreshold;
    use curfew_host_api::{HostAction, MockHost, MockPublisher, Publication};
    use curfew_store::InMemoryStore;

    fn snapshot(seconds: f64) -> UsageSnapshot {
        UsageSnapshot {
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            seconds_today: seconds,
        }
    }

    struct Fixture {
        host: Arc<MockHost>,
        publisher: Arc<MockPublisher>,
        dispatcher: Dispatcher<MockHost>,
        persist_rx: watch::Receiver<UsageSnapshot>,
    }

    fn fixture() -> Fixture {
        let host = Arc::new(MockHost::new());
        let publisher = Arc::new(MockPublisher::new());
        let (persist_tx, persist_rx) = watch::channel(snapshot(0.0));
        let dispatcher = Dispatcher::new(
            Arc::clone(&host),
            publisher.clone(),
            Language::En.phrases(),
            ChildId::new("alice"),
            persist_tx,
        );
        Fixture {
            host,
            publisher,
            dispatcher,
            persist_rx,
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_grace_start_shows_banner_and_speaks() {
        let f = fixture();
        f.dispatcher.dispatch(CoreEvent::GraceStarted {
            deadline: MonotonicInstant::now(),
        });
        settle().await;

        assert_eq!(
            f.host.actions(),
            vec![
                HostAction::Notify {
                    title: "Screen Time".into(),
                    body: "Screen time will end in 1 minute.".into(),
                },
                HostAction::Speak("Screen time will end in one minute.".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_final_warning_speaks_child_name() {
        let f = fixture();
        f.dispatcher.dispatch(CoreEvent::FinalWarning);
        settle().await;
        assert_eq!(
            f.host.spoken(),
            vec!["You have used all your screen time alice.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_one_minute_warning_is_voice_only() {
        let f = fixture();
        f.dispatcher
            .dispatch(CoreEvent::BudgetWarning(BudgetThreshold::OneMinute));
        settle().await;
        assert_eq!(
            f.host.actions(),
            vec![HostAction::Speak(
                "You have one minute of screen time left.".into()
            )]
        );

        let f = fixture();
        f.dispatcher
            .dispatch(CoreEvent::BudgetWarning(BudgetThreshold::FiveMinutes));
        settle().await;
        assert_eq!(f.host.actions().len(), 2);
    }

    #[tokio::test]
    async fn test_enforcement_dispatch() {
        let f = fixture();
        f.dispatcher.dispatch(CoreEvent::Enforce(EnforcementAction::Lock));
        settle().await;
        assert_eq!(f.host.lock_count(), 1);
        assert!(!f.dispatcher.is_enforcing());

        f.dispatcher.dispatch(CoreEvent::Enforce(EnforcementAction::Logout));
        settle().await;
        assert_eq!(f.host.logout_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enforcement_not_duplicated_while_in_flight() {
        let f = fixture();
        f.host.set_action_delay(Some(Duration::from_secs(2)));

        f.dispatcher.dispatch(CoreEvent::Enforce(EnforcementAction::Lock));
        settle().await;
        assert!(f.dispatcher.is_enforcing());
        f.dispatcher.dispatch(CoreEvent::Enforce(EnforcementAction::Lock));

        tokio::time::sleep(Duration::from_secs(3)).await;
        settle().await;
        assert_eq!(f.host.lock_count(), 1);
        assert!(!f.dispatcher.is_enforcing());

        f.dispatcher.dispatch(CoreEvent::Enforce(EnforcementAction::Lock));
        tokio::time::sleep(Duration::from_secs(3)).await;
        settle().await;
        assert_eq!(f.host.lock_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_action_times_out() {
        let f = fixture();
        f.host.set_action_delay(Some(Duration::from_secs(60)));

        f.dispatcher.dispatch(CoreEvent::Enforce(EnforcementAction::Logout));
        settle().await;
        assert!(f.dispatcher.is_enforcing());

        tokio::time::sleep(ACTION_TIMEOUT + Duration::from_secs(1)).await;
        settle().await;
        assert!(!f.dispatcher.is_enforcing());
    }

    #[tokio::test]
    async fn test_failed_action_is_logged_not_fatal() {
        let f = fixture();
        f.host.set_fail_actions(true);
        f.dispatcher.dispatch(CoreEvent::Enforce(EnforcementAction::Lock));
        settle().await;
        assert!(!f.dispatcher.is_enforcing());
    }

    #[tokio::test]
    async fn test_publications_forwarded() {
        let f = fixture();
        let report = StatusReport {
            status: ConnectionStatus::Online,
            version: "0.1.0".into(),
            child_id: ChildId::new("alice"),
            device_id: String::from("den").into(),
            allowed: true,
            minutes_today: 3,
            last_allowed_payload: None,
            timestamp: "2025-03-01T10:00:00+00:00".into(),
        };

        f.dispatcher.dispatch_all(vec![
            CoreEvent::PublishMinutes(3),
            CoreEvent::PublishActive(false),
            CoreEvent::PublishStatus(report.clone()),
        ]);

        assert_eq!(
            f.publisher.published(),
            vec![
                Publication::Minutes(3),
                Publication::Active(false),
                Publication::Status(report),
            ]
        );
    }

    #[tokio::test]
    async fn test_persist_goes_through_watch_channel() {
        let mut f = fixture();
        f.dispatcher.dispatch(CoreEvent::PersistUsage(snapshot(42.0)));
        assert!(f.persist_rx.has_changed().unwrap());
        assert_eq!(*f.persist_rx.borrow_and_update(), snapshot(42.0));
    }

    #[tokio::test]
    async fn test_usage_writer_flushes_last_value_on_close() {
        let store = Arc::new(InMemoryStore::new());
        let (tx, rx) = watch::channel(snapshot(0.0));
        let writer = spawn_usage_writer(store.clone(), rx);

        tx.send(snapshot(10.0)).unwrap();
        tx.send(snapshot(20.0)).unwrap();
        drop(tx);
        writer.await.unwrap();

        assert_eq!(store.load_usage().unwrap(), Some(snapshot(20.0)));
        assert!(store.save_count() >= 1);
    }
}
