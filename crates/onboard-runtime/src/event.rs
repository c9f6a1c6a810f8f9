#![forbid(unsafe_code)]

//! Events consumed by the controller's loop and transitions it reports.

use core::time::Duration;

/// Input to the sequencing loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourEvent {
    /// The one-shot timer of `step` reached its deadline `at`.
    TimerExpired { step: usize, at: Duration },
    /// The host confirmed the current step at `at`.
    ConfirmReceived { at: Duration },
}

/// Why a step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceReason {
    Timer,
    Confirm,
}

/// A completed transition, recorded for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourTransition {
    /// The tour moved from step `from` to step `to`.
    Advanced {
        from: usize,
        to: usize,
        reason: AdvanceReason,
    },
    /// Step `last` was the final step; the tour reset.
    Finished { last: usize, reason: AdvanceReason },
}

/// The single outstanding timer of a timed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub step: usize,
    pub deadline: Duration,
}

impl PendingTimer {
    #[must_use]
    pub fn is_due(self, now: Duration) -> bool {
        self.deadline <= now
    }

    /// Time left until the deadline, zero once due.
    #[must_use]
    pub fn remaining(self, now: Duration) -> Duration {
        self.deadline.saturating_sub(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_timer_due_at_deadline() {
        let timer = PendingTimer {
            step: 0,
            deadline: Duration::from_millis(100),
        };
        assert!(!timer.is_due(Duration::from_millis(99)));
        assert!(timer.is_due(Duration::from_millis(100)));
        assert_eq!(timer.remaining(Duration::from_millis(30)), Duration::from_millis(70));
        assert_eq!(timer.remaining(Duration::from_millis(300)), Duration::ZERO);
    }
}
