//! Persistence layer for curfewd
//!
//! The only persisted state is today's [`UsageSnapshot`]. [`JsonFileStore`]
//! keeps it in a single file replaced atomically on every save;
//! [`InMemoryStore`] backs tests.

mod json;
mod memory;
mod traits;

pub use json::*;
pub use memory::*;
pub use traits::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state file is not valid usage JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("state file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
