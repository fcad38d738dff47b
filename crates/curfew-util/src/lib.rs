//! Shared utilities for curfewd
//!
//! This crate provides:
//! - ID types (ChildId, DeviceId)
//! - Time utilities (monotonic time, mockable wall-clock time)
//! - Default paths for config, data, and log files

mod ids;
mod paths;
mod time;

pub use ids::*;
pub use paths::*;
pub use time::*;
