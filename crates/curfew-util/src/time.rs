//! Time utilities for curfewd
//!
//! Provides both monotonic time (for grace windows and offline tracking) and
//! wall-clock time (for the per-day usage counter and status timestamps).
//!
//! # Mock Time for Development
//!
//! In debug builds, the `CURFEW_MOCK_TIME` environment variable can be set
//! to override the wall-clock time. This is useful for exercising the
//! midnight rollover without waiting for it.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 23:58:30`)
//!
//! Example:
//! ```bash
//! CURFEW_MOCK_TIME="2025-12-25 23:58:30" cargo run -p curfewd
//! ```

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "CURFEW_MOCK_TIME";

const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Offset from real time, fixed on first use; mock time then advances in step
/// with the real clock.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

/// Parse a `CURFEW_MOCK_TIME` value as local time
pub fn parse_mock_time(value: &str) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), MOCK_TIME_FORMAT).ok()?;
    Local.from_local_datetime(&naive).single()
}

#[cfg(debug_assertions)]
#[allow(clippy::disallowed_methods)] // Reads the real clock to compute the offset
fn mock_time_offset_from_env() -> Option<chrono::Duration> {
    let value = std::env::var(MOCK_TIME_ENV_VAR).ok()?;
    let Some(mock) = parse_mock_time(&value) else {
        tracing::warn!(
            mock_time = %value,
            expected_format = MOCK_TIME_FORMAT,
            "Ignoring unparseable mock time"
        );
        return None;
    };
    let offset = mock.signed_duration_since(Local::now());
    tracing::info!(mock_time = %value, offset_secs = offset.num_seconds(), "Mock time enabled");
    Some(offset)
}

#[cfg(not(debug_assertions))]
fn mock_time_offset_from_env() -> Option<chrono::Duration> {
    None
}

fn mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(mock_time_offset_from_env)
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
#[allow(clippy::disallowed_methods)] // This is the wrapper that provides mock time support
pub fn now() -> DateTime<Local> {
    let real = Local::now();
    mock_time_offset().map_or(real, |offset| real + offset)
}

/// The local calendar day used for the usage counter.
pub fn today() -> NaiveDate {
    now().date_naive()
}

/// Timestamp format used in status reports.
pub fn format_timestamp(dt: &DateTime<Local>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// A point on the monotonic clock, used for deadlines and rate limits so
/// that wall-clock jumps cannot stretch or skip them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonotonicInstant(Instant);

impl MonotonicInstant {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    /// Duration since `earlier`, or zero if `earlier` is later than `self`
    pub fn duration_since(&self, earlier: MonotonicInstant) -> Duration {
        self.0.saturating_duration_since(earlier.0)
    }

    /// Returns duration until `self`, or zero if `self` is in the past
    pub fn saturating_duration_until(&self, from: MonotonicInstant) -> Duration {
        self.0.saturating_duration_since(from.0)
    }
}

impl std::ops::Add<Duration> for MonotonicInstant {
    type Output = MonotonicInstant;

    fn add(self, rhs: Duration) -> Self::Output {
        MonotonicInstant(self.0 + rhs)
    }
}

/// Compact human form: `45s`, `2m 5s`, `1h 0m 10s`
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    match (secs / 3600, secs % 3600 / 60, secs % 60) {
        (0, 0, s) => format!("{s}s"),
        (0, m, s) => format!("{m}m {s}s"),
        (h, m, s) => format!("{h}h {m}m {s}s"),
    }
}
