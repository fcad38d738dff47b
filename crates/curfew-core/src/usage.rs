//! Daily usage accumulation

use chrono::NaiveDate;
use curfew_store::UsageSnapshot;
use tracing::{debug, info};

/// Active-session seconds for the current local calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct UsageAccumulator {
    date: NaiveDate,
    seconds_today: f64,
}

impl UsageAccumulator {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: today,
            seconds_today: 0.0,
        }
    }

    /// Restore from a persisted snapshot; a snapshot from another day is discarded.
    pub fn from_snapshot(snapshot: Option<UsageSnapshot>, today: NaiveDate) -> Self {
        match snapshot {
            Some(snapshot) if snapshot.date == today => {
                let seconds = if snapshot.seconds_today.is_finite() {
                    snapshot.seconds_today.max(0.0)
                } else {
                    0.0
                };
                debug!(date = %today, seconds_today = seconds, "Restored usage");
                Self {
                    date: today,
                    seconds_today: seconds,
                }
            }
            Some(snapshot) => {
                info!(stored = %snapshot.date, today = %today, "Discarding usage from another day");
                Self::new(today)
            }
            None => Self::new(today),
        }
    }

    /// Reset the counter when `today` is a different day. Returns whether it did.
    pub fn roll_over_if_new_day(&mut self, today: NaiveDate) -> bool {
        if self.date == today {
            return false;
        }

        info!(
            previous = %self.date,
            today = %today,
            minutes = self.minutes_today(),
            "New day, resetting usage"
        );
        self.date = today;
        self.seconds_today = 0.0;
        true
    }

    /// Count `elapsed` toward today's usage if the session was active.
    /// Zero and negative durations are ignored.
    pub fn advance(&mut self, elapsed: chrono::Duration, active: bool) -> bool {
        if !active || elapsed <= chrono::Duration::zero() {
            return false;
        }

        self.seconds_today += elapsed.num_milliseconds() as f64 / 1000.0;
        true
    }

    pub fn minutes_today(&self) -> u64 {
        (self.seconds_today / 60.0).floor() as u64
    }

    pub fn seconds_today(&self) -> f64 {
        self.seconds_today
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            date: self.date,
            seconds_today: self.seconds_today,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
    }

    #[test]
    fn test_minutes_are_floored_sum_of_active_time() {
        let mut usage = UsageAccumulator::new(day(25));
        let mut last = 0;
        let mut total = 0i64;

        for step in [15, 15, 15, 14, 1, 45, 30] {
            usage.advance(chrono::Duration::seconds(step), true);
            total += step;
            let minutes = usage.minutes_today();
            assert!(minutes >= last, "minutes must never decrease");
            assert_eq!(minutes, (total / 60) as u64);
            last = minutes;
        }
        assert_eq!(usage.minutes_today(), 2);
    }

    #[test]
    fn test_inactive_time_not_counted() {
        let mut usage = UsageAccumulator::new(day(25));
        assert!(!usage.advance(chrono::Duration::seconds(600), false));
        assert_eq!(usage.seconds_today(), 0.0);
    }

    #[test]
    fn test_non_positive_elapsed_ignored() {
        let mut usage = UsageAccumulator::new(day(25));
        usage.advance(chrono::Duration::seconds(90), true);
        assert!(!usage.advance(chrono::Duration::seconds(-30), true));
        assert!(!usage.advance(chrono::Duration::zero(), true));
        assert_eq!(usage.seconds_today(), 90.0);
    }

    #[test]
    fn test_fractional_seconds_accumulate() {
        let mut usage = UsageAccumulator::new(day(25));
        for _ in 0..4 {
            usage.advance(chrono::Duration::milliseconds(15_250), true);
        }
        assert_eq!(usage.seconds_today(), 61.0);
        assert_eq!(usage.minutes_today(), 1);
    }

    #[test]
    fn test_rollover_resets_once() {
        let mut usage = UsageAccumulator::new(day(25));
        usage.advance(chrono::Duration::seconds(3600), true);

        assert!(!usage.roll_over_if_new_day(day(25)));
        assert_eq!(usage.minutes_today(), 60);

        assert!(usage.roll_over_if_new_day(day(26)));
        assert_eq!(usage.minutes_today(), 0);
        assert_eq!(usage.date(), day(26));

        usage.advance(chrono::Duration::seconds(60), true);
        assert!(!usage.roll_over_if_new_day(day(26)));
        assert_eq!(usage.minutes_today(), 1);
    }

    #[test]
    fn test_restore_same_day() {
        let snapshot = UsageSnapshot {
            date: day(25),
            seconds_today: 900.0,
        };
        let usage = UsageAccumulator::from_snapshot(Some(snapshot), day(25));
        assert_eq!(usage.minutes_today(), 15);
        assert_eq!(usage.snapshot(), snapshot);
    }

    #[test]
    fn test_restore_other_day_discarded() {
        let snapshot = UsageSnapshot {
            date: day(24),
            seconds_today: 900.0,
        };
        let usage = UsageAccumulator::from_snapshot(Some(snapshot), day(25));
        assert_eq!(usage.seconds_today(), 0.0);
        assert_eq!(usage.date(), day(25));
    }

    #[test]
    fn test_restore_sanitizes_bad_values() {
        let snapshot = UsageSnapshot {
            date: day(25),
            seconds_today: -12.0,
        };
        let usage = UsageAccumulator::from_snapshot(Some(snapshot), day(25));
        assert_eq!(usage.seconds_today(), 0.0);
    }
}
