//! Wire types for curfewd
//!
//! This crate defines what curfewd exchanges with the broker:
//! - Topic layout (inbound permission and budget, outbound metrics)
//! - Payload parsing for permission tokens and budgets
//! - Status heartbeat and online announcement
//! - Home Assistant discovery configs

mod discovery;
mod topics;
mod types;

pub use discovery::*;
pub use topics::*;
pub use types::*;

/// Agent version reported in status and discovery payloads
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
