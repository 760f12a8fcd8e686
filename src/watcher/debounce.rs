//! Trailing-edge debounce state.
//!
//! `PendingTrigger` is a plain state machine with the clock passed in, so
//! the watch loop owns all timing and tests can drive it directly.

use std::time::Duration;

use tokio::time::Instant;

/// Debounce state owned by a single watch loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PendingTrigger {
    /// No restart scheduled.
    #[default]
    Idle,
    /// A restart is scheduled for `deadline`.
    Pending {
        /// Timestamp of the last qualifying event.
        last_event: Instant,
        /// `last_event + interval`.
        deadline: Instant,
    },
}

impl PendingTrigger {
    /// Record a qualifying event at `at`.
    ///
    /// Schedules a trigger when idle and pushes the deadline back when one
    /// is already pending. Never queues a second trigger.
    pub fn observe(&mut self, at: Instant, interval: Duration) {
        let last_event = match *self {
            Self::Pending { last_event, .. } if last_event > at => last_event,
            _ => at,
        };
        *self = Self::Pending {
            last_event,
            deadline: last_event + interval,
        };
    }

    /// Deadline of the pending trigger, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        match self {
            Self::Idle => None,
            Self::Pending { deadline, .. } => Some(*deadline),
        }
    }

    /// Whether a trigger is scheduled.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// Consume the trigger if its deadline has passed at `now`.
    ///
    /// Returns `true` exactly once per scheduled trigger and leaves the
    /// state idle.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                *self = Self::Idle;
                true
            }
            _ => false,
        }
    }

    /// Drop any scheduled trigger.
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}
