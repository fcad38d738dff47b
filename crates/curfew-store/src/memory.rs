//! In-memory store (for testing)

use std::sync::{Mutex, PoisonError};

use crate::{StoreResult, UsageSnapshot, UsageStore};

#[derive(Default)]
pub struct InMemoryStore {
    snapshot: Mutex<Option<UsageSnapshot>>,
    saves: Mutex<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UsageStore for InMemoryStore {
    fn load_usage(&self) -> StoreResult<Option<UsageSnapshot>> {
        Ok(*self.snapshot.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn save_usage(&self, snapshot: &UsageSnapshot) -> StoreResult<()> {
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = Some(*snapshot);
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        true
    }
}
