//! Linux host adapter implementation
//!
//! Session state comes from systemd-logind through `loginctl`. Idle time
//! prefers `xprintidle` on X11 and falls back to logind's idle hints.

use async_trait::async_trait;
use curfew_host_api::{
    Enforcer, HostAdapter, HostCapabilities, HostError, HostResult, Notifier, SessionSensor,
};
use std::env;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::process::{find_in_path, run_command};

const LOGINCTL: &str = "loginctl";
const XPRINTIDLE: &str = "xprintidle";
const NOTIFY_SEND: &str = "notify-send";

/// logind session alias for the caller's own session
const SELF_SESSION: &str = "self";

/// Where idle time is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleSource {
    Xprintidle,
    Logind,
}

/// Text-to-speech backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechBackend {
    SpeechDispatcher,
    Espeak,
}

impl SpeechBackend {
    fn detect() -> Option<Self> {
        if find_in_path("spd-say").is_some() {
            Some(Self::SpeechDispatcher)
        } else if find_in_path("espeak").is_some() {
            Some(Self::Espeak)
        } else {
            None
        }
    }

    fn program(self) -> &'static str {
        match self {
            Self::SpeechDispatcher => "spd-say",
            Self::Espeak => "espeak",
        }
    }

    fn args(self, text: &str) -> Vec<&str> {
        match self {
            // -w waits until the message has been spoken
            Self::SpeechDispatcher => vec!["-w", text],
            Self::Espeak => vec![text],
        }
    }
}

/// Linux host adapter
pub struct LinuxHost {
    capabilities: HostCapabilities,
    session_id: String,
    idle_source: Option<IdleSource>,
    speech: Option<SpeechBackend>,
}

impl LinuxHost {
    /// Probe the environment for the session and available tools
    pub fn new() -> Self {
        let session_id = env::var("XDG_SESSION_ID")
            .ok()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| SELF_SESSION.to_string());

        let has_loginctl = find_in_path(LOGINCTL).is_some();
        let idle_source = if find_in_path(XPRINTIDLE).is_some() && env::var_os("DISPLAY").is_some()
        {
            Some(IdleSource::Xprintidle)
        } else if has_loginctl {
            Some(IdleSource::Logind)
        } else {
            None
        };
        let speech = SpeechBackend::detect();

        let capabilities = HostCapabilities {
            can_read_idle: idle_source.is_some(),
            can_read_lock_state: has_loginctl,
            can_lock: has_loginctl,
            can_logout: has_loginctl,
            can_notify: find_in_path(NOTIFY_SEND).is_some(),
            can_speak: speech.is_some(),
        };

        info!(
            session_id = %session_id,
            idle_source = ?idle_source,
            speech = ?speech,
            "Linux host adapter initialized"
        );
        let missing = capabilities.missing();
        if !missing.is_empty() {
            warn!(missing = ?missing, "Some host capabilities are unavailable");
        }

        Self {
            capabilities,
            session_id,
            idle_source,
            speech,
        }
    }

    async fn logind_idle(&self) -> HostResult<Duration> {
        let out = run_command(
            LOGINCTL,
            &[
                "show-session",
                &self.session_id,
                "-p",
                "IdleHint",
                "-p",
                "IdleSinceHint",
            ],
        )
        .await?;
        let now_micros = u64::try_from(chrono::Utc::now().timestamp_micros()).unwrap_or(0);
        parse_logind_idle(&out, now_micros).ok_or_else(|| HostError::UnexpectedOutput {
            command: LOGINCTL.to_string(),
            output: out,
        })
    }
}

impl Default for LinuxHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionSensor for LinuxHost {
    async fn is_session_locked(&self) -> HostResult<bool> {
        let out = run_command(
            LOGINCTL,
            &["show-session", &self.session_id, "-p", "LockedHint", "--value"],
        )
        .await?;
        parse_yes_no(&out).ok_or_else(|| HostError::UnexpectedOutput {
            command: LOGINCTL.to_string(),
            output: out,
        })
    }

    async fn idle_duration(&self) -> HostResult<Duration> {
        match self.idle_source {
            Some(IdleSource::Xprintidle) => {
                let out = run_command(XPRINTIDLE, &[]).await?;
                parse_xprintidle(&out).ok_or_else(|| HostError::UnexpectedOutput {
                    command: XPRINTIDLE.to_string(),
                    output: out,
                })
            }
            Some(IdleSource::Logind) => self.logind_idle().await,
            None => Err(HostError::Unsupported("idle time")),
        }
    }
}

#[async_trait]
impl Enforcer for LinuxHost {
    async fn lock_session(&self) -> HostResult<()> {
        info!(session_id = %self.session_id, "Locking session");
        run_command(LOGINCTL, &["lock-session", &self.session_id]).await?;
        Ok(())
    }

    async fn logout_session(&self) -> HostResult<()> {
        info!(session_id = %self.session_id, "Terminating session");
        run_command(LOGINCTL, &["terminate-session", &self.session_id]).await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for LinuxHost {
    async fn notify(&self, title: &str, body: &str) -> HostResult<()> {
        debug!(title, body, "Showing notification");
        run_command(NOTIFY_SEND, &[title, body]).await?;
        Ok(())
    }

    async fn speak(&self, text: &str) -> HostResult<()> {
        let backend = self.speech.ok_or(HostError::Unsupported("speech"))?;
        debug!(backend = backend.program(), text, "Speaking");
        run_command(backend.program(), &backend.args(text)).await?;
        Ok(())
    }
}

impl HostAdapter for LinuxHost {
    fn capabilities(&self) -> &HostCapabilities {
        &self.capabilities
    }

    fn is_healthy(&self) -> bool {
        self.capabilities.can_lock || self.capabilities.can_logout
    }
}

/// Parse logind's `yes`/`no` property values
pub fn parse_yes_no(output: &str) -> Option<bool> {
    match output.trim() {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

/// `xprintidle` prints idle milliseconds
pub fn parse_xprintidle(output: &str) -> Option<Duration> {
    output.trim().parse::<u64>().ok().map(Duration::from_millis)
}

/// Parse `IdleHint=..` / `IdleSinceHint=..` lines into an idle duration.
///
/// A session that is not idle reports zero; `IdleSinceHint` is microseconds
/// since the epoch.
pub fn parse_logind_idle(output: &str, now_micros: u64) -> Option<Duration> {
    let mut idle_hint = None;
    let mut idle_since = None;

    for line in output.lines() {
        match line.trim().split_once('=') {
            Some(("IdleHint", value)) => idle_hint = parse_yes_no(value),
            Some(("IdleSinceHint", value)) => idle_since = value.trim().parse::<u64>().ok(),
            _ => {}
        }
    }

    match (idle_hint?, idle_since) {
        (false, _) => Some(Duration::ZERO),
        (true, Some(since)) if since > 0 => {
            Some(Duration::from_micros(now_micros.saturating_sub(since)))
        }
        (true, _) => None,
    }
}
