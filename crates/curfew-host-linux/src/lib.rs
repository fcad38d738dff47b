//! Linux host adapter for curfewd
//!
//! Provides:
//! - Lock state and idle time of the current logind session
//! - Locking and terminating the session
//! - Desktop notifications and text-to-speech

mod adapter;
mod process;

pub use adapter::*;
pub use process::*;
