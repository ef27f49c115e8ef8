//! DeadlineTimer port.
//!
//! `arm` schedules a single-shot deadline for one trial and returns a guard.
//! Dropping the guard cancels the deadline. When a deadline elapses the
//! implementation reports the `TrialId` it was armed for; it never touches
//! session state itself.

use std::time::Duration;

use crate::domain::TrialId;

pub trait DeadlineTimer: Send {
    /// Held by the trial while it is armed. Dropping it cancels the deadline.
    type Guard: Send;

    /// Schedule a deadline for `trial`, `after` from now.
    fn arm(&mut self, trial: TrialId, after: Duration) -> Self::Guard;
}
