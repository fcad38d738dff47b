//! Store trait definitions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::StoreResult;

/// Persistence for the daily usage counter
pub trait UsageStore: Send + Sync {
    /// Load the last saved snapshot, if any
    fn load_usage(&self) -> StoreResult<Option<UsageSnapshot>>;

    /// Replace the saved snapshot
    fn save_usage(&self, snapshot: &UsageSnapshot) -> StoreResult<()>;

    /// Whether the last operation succeeded
    fn is_healthy(&self) -> bool;
}

/// Persisted usage for one local calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub date: NaiveDate,
    pub seconds_today: f64,
}

impl UsageSnapshot {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            seconds_today: 0.0,
        }
    }
}
