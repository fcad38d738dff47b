//! Core events emitted by the decider

use chrono::NaiveDate;
use curfew_api::StatusReport;
use curfew_store::UsageSnapshot;
use curfew_util::MonotonicInstant;

use crate::BudgetThreshold;

/// Concrete enforcement to dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforcementAction {
    Lock,
    Logout,
}

/// Events emitted by the decider; the service turns them into side effects
#[derive(Debug, Clone, PartialEq)]
pub enum CoreEvent {
    /// Effective permission flipped
    PermissionChanged { allowed: bool },

    /// A block decision opened a grace window
    GraceStarted { deadline: MonotonicInstant },

    /// The grace window elapsed while still blocked
    FinalWarning,

    /// Remaining budget crossed a threshold
    BudgetWarning(BudgetThreshold),

    /// A new daily budget was installed
    BudgetChanged { budget_minutes: f64 },

    /// Lock or log out now
    Enforce(EnforcementAction),

    /// The usage counter was reset for a new day
    DayRolledOver { date: NaiveDate },

    PublishMinutes(u64),

    PublishActive(bool),

    PublishStatus(StatusReport),

    /// Write the usage snapshot to disk
    PersistUsage(UsageSnapshot),
}
