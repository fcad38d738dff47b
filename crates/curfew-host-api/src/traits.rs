//! Host adapter traits

use async_trait::async_trait;
use curfew_api::StatusReport;
use std::time::Duration;
use thiserror::Error;

use crate::HostCapabilities;

/// Errors from host adapter operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Command not available: {0}")]
    CommandMissing(String),

    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Unexpected output from '{command}': {output:?}")]
    UnexpectedOutput { command: String, output: String },

    #[error("Not supported on this host: {0}")]
    Unsupported(&'static str),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type HostResult<T> = Result<T, HostError>;

/// Reads the state of the local user session
#[async_trait]
pub trait SessionSensor: Send + Sync {
    /// Whether the screen is currently locked
    async fn is_session_locked(&self) -> HostResult<bool>;

    /// Time since the last user input
    async fn idle_duration(&self) -> HostResult<Duration>;
}

/// Carries out enforcement on the local session
#[async_trait]
pub trait Enforcer: Send + Sync {
    async fn lock_session(&self) -> HostResult<()>;

    async fn logout_session(&self) -> HostResult<()>;
}

/// Shows banners and speaks messages to the user
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, body: &str) -> HostResult<()>;

    async fn speak(&self, text: &str) -> HostResult<()>;
}

/// Host adapter - implemented by platform-specific adapters
pub trait HostAdapter: SessionSensor + Enforcer + Notifier {
    /// Get the capabilities of this host adapter
    fn capabilities(&self) -> &HostCapabilities;

    /// Optional: check if the host adapter is healthy
    fn is_healthy(&self) -> bool {
        true
    }
}

/// Errors from outbound metric publication
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Outbound queue is full or closed: {0}")]
    Rejected(String),
}

/// Outbound reporting of usage, activity and status.
///
/// Implementations must not block: a publication is queued or dropped.
pub trait MetricsPublisher: Send + Sync {
    fn publish_minutes(&self, minutes: u64) -> Result<(), PublishError>;

    fn publish_active(&self, active: bool) -> Result<(), PublishError>;

    fn publish_status(&self, report: &StatusReport) -> Result<(), PublishError>;
}
