//! Host adapter trait interfaces for curfewd
//!
//! This crate defines the capability-based interface between the daemon core
//! and platform-specific implementations. It contains no platform code itself.

mod activity;
mod capabilities;
mod mock;
mod traits;

pub use activity::*;
pub use capabilities::*;
pub use mock::*;
pub use traits::*;
