//! Enforcement decision engine for curfewd
//!
//! Everything here is synchronous and driven by explicit time arguments:
//! - Daily usage accounting with midnight rollover
//! - Connectivity fail-safe combining the remote signal with broker state
//! - Grace window between a block decision and enforcement
//! - Remaining-budget warnings
//!
//! [`EnforcementDecider`] ties these together and reports side effects as
//! [`CoreEvent`]s for the service to carry out.

mod budget;
mod decider;
mod events;
mod failsafe;
mod grace;
mod usage;

pub use budget::*;
pub use decider::*;
pub use events::*;
pub use failsafe::*;
pub use grace::*;
pub use usage::*;
