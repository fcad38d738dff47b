//! Remaining-budget warnings

use tracing::info;

/// Which remaining-time warning fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetThreshold {
    FiveMinutes,
    OneMinute,
}

impl BudgetThreshold {
    pub fn minutes(self) -> u64 {
        match self {
            Self::FiveMinutes => 5,
            Self::OneMinute => 1,
        }
    }

    /// The last-minute warning is spoken only
    pub fn voice_only(self) -> bool {
        matches!(self, Self::OneMinute)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BudgetWarningTracker {
    budget_minutes: Option<f64>,
    warned_5: bool,
    warned_1: bool,
}

impl BudgetWarningTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new budget, clamped to zero. Re-arms both warnings.
    pub fn set_budget(&mut self, minutes: f64) -> f64 {
        let minutes = minutes.max(0.0);
        info!(budget_minutes = minutes, "Daily budget updated");
        self.budget_minutes = Some(minutes);
        self.warned_5 = false;
        self.warned_1 = false;
        minutes
    }

    pub fn budget_minutes(&self) -> Option<f64> {
        self.budget_minutes
    }

    /// Evaluate thresholds for the current usage. At most one warning per call.
    pub fn check(&mut self, minutes_today: u64) -> Option<BudgetThreshold> {
        let budget = self.budget_minutes?;
        let remaining = budget - minutes_today as f64;

        let mut fired = None;
        if remaining <= 1.0 && !self.warned_1 {
            self.warned_1 = true;
            self.warned_5 = true;
            fired = Some(BudgetThreshold::OneMinute);
        } else if remaining <= 5.0 && !self.warned_5 {
            self.warned_5 = true;
            fired = Some(BudgetThreshold::FiveMinutes);
        }

        if remaining > 5.0 {
            self.warned_5 = false;
        }
        if remaining > 1.0 {
            self.warned_1 = false;
        }

        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_budget_no_warnings() {
        let mut tracker = BudgetWarningTracker::new();
        for minutes in 0..300 {
            assert_eq!(tracker.check(minutes), None);
        }
    }

    #[test]
    fn crossing_sequence_warns_once_each() {
        let mut tracker = BudgetWarningTracker::new();
        tracker.set_budget(10.0);

        assert_eq!(tracker.check(4), None);
        assert_eq!(tracker.check(5), Some(BudgetThreshold::FiveMinutes));
        assert_eq!(tracker.check(6), None);
        assert_eq!(tracker.check(9), Some(BudgetThreshold::OneMinute));
        assert_eq!(tracker.check(10), None);
        assert_eq!(tracker.check(11), None);
    }

    #[test]
    fn jumping_straight_past_both_thresholds_fires_one_minute_only() {
        let mut tracker = BudgetWarningTracker::new();
        tracker.set_budget(10.0);

        assert_eq!(tracker.check(9), Some(BudgetThreshold::OneMinute));
        assert_eq!(tracker.check(9), None);
    }

    #[test]
    fn new_budget_rearms_without_time_passing() {
        let mut tracker = BudgetWarningTracker::new();
        tracker.set_budget(10.0);
        tracker.check(5);
        tracker.check(9);

        tracker.set_budget(20.0);
        assert_eq!(tracker.check(9), None);
        assert_eq!(tracker.check(15), Some(BudgetThreshold::FiveMinutes));

        // Same budget again still re-arms
        tracker.set_budget(20.0);
        assert_eq!(tracker.check(15), Some(BudgetThreshold::FiveMinutes));
    }

    #[test]
    fn recovery_above_threshold_rearms() {
        let mut tracker = BudgetWarningTracker::new();
        tracker.set_budget(10.0);
        assert_eq!(tracker.check(5), Some(BudgetThreshold::FiveMinutes));

        // Day rolled over, usage back at zero
        assert_eq!(tracker.check(0), None);
        assert_eq!(tracker.check(5), Some(BudgetThreshold::FiveMinutes));
    }

    #[test]
    fn negative_budget_is_clamped() {
        let mut tracker = BudgetWarningTracker::new();
        assert_eq!(tracker.set_budget(-15.0), 0.0);
        assert_eq!(tracker.budget_minutes(), Some(0.0));
        assert_eq!(tracker.check(0), Some(BudgetThreshold::OneMinute));
    }

    #[test]
    fn fractional_budget() {
        let mut tracker = BudgetWarningTracker::new();
        tracker.set_budget(7.5);
        assert_eq!(tracker.check(2), None);
        assert_eq!(tracker.check(3), Some(BudgetThreshold::FiveMinutes));
        assert_eq!(tracker.check(6), None);
        assert_eq!(tracker.check(7), Some(BudgetThreshold::OneMinute));
    }

    #[test]
    fn threshold_properties() {
        assert_eq!(BudgetThreshold::FiveMinutes.minutes(), 5);
        assert!(!BudgetThreshold::FiveMinutes.voice_only());
        assert!(BudgetThreshold::OneMinute.voice_only());
    }
}
