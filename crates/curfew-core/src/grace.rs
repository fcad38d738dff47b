//! Countdown between a block decision and enforcement

use curfew_util::MonotonicInstant;
use std::time::Duration;

/// Result of [`GraceWindow::should_enforce_now`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraceCheck {
    pub enforce: bool,
    /// Set exactly once per block transition: on the first check inside the
    /// window, or at the deadline if no check landed inside it
    pub final_warning: bool,
}

#[derive(Debug, Clone)]
pub struct GraceWindow {
    length: Duration,
    deadline: Option<MonotonicInstant>,
    final_warning_sent: bool,
    blocked: bool,
}

impl GraceWindow {
    pub fn new(length: Duration) -> Self {
        Self {
            length,
            deadline: None,
            final_warning_sent: false,
            blocked: false,
        }
    }

    /// Feed the current decision. Returns the new deadline when this call
    /// opened a window; repeated blocked decisions never reopen or extend it.
    pub fn on_decision_changed(
        &mut self,
        allowed: bool,
        now: MonotonicInstant,
    ) -> Option<MonotonicInstant> {
        if allowed {
            self.blocked = false;
            self.deadline = None;
            self.final_warning_sent = false;
            return None;
        }

        if self.blocked {
            return None;
        }

        let deadline = now + self.length;
        self.blocked = true;
        self.deadline = Some(deadline);
        self.final_warning_sent = false;
        Some(deadline)
    }

    pub fn should_enforce_now(&mut self, now: MonotonicInstant) -> GraceCheck {
        if !self.blocked {
            return GraceCheck::default();
        }

        match self.deadline {
            Some(deadline) if now < deadline => GraceCheck {
                enforce: false,
                final_warning: self.take_final_warning(),
            },
            Some(_) => {
                self.deadline = None;
                GraceCheck {
                    enforce: true,
                    final_warning: self.take_final_warning(),
                }
            }
            None => GraceCheck {
                enforce: true,
                final_warning: false,
            },
        }
    }

    fn take_final_warning(&mut self) -> bool {
        !std::mem::replace(&mut self.final_warning_sent, true)
    }

    pub fn is_open(&self) -> bool {
        self.deadline.is_some()
    }
}
