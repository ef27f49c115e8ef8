//! IdGenerator port.
//!
//! ULIDs take their timestamp from the `Clock`, so ids generated under a
//! `FixedClock` share a timestamp and differ only in the random part.

use ulid::Ulid;

use crate::domain::ids::{SessionId, TrialId};
use crate::ports::Clock;

/// Source of typed identifiers.
///
/// # Contract
/// - every call returns a fresh id
/// - ids of one kind sort by creation time when the clock moves forward
pub trait IdGenerator: Send + Sync {
    /// Id for a new session. Called once per `SessionBuilder::build`.
    fn session_id(&self) -> SessionId;

    /// Id for a new trial instance. Deadline fires carry it back, so it
    /// must never repeat within a session.
    fn trial_id(&self) -> TrialId;
}

/// ULID-backed generator. Timestamp from `C`, randomness from `rand`.
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn session_id(&self) -> SessionId {
        SessionId::from_ulid(self.next())
    }

    fn trial_id(&self) -> TrialId {
        TrialId::from_ulid(self.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn generates_unique_trial_ids() {
        let ids = UlidGenerator::new(SystemClock);
        let a = ids.trial_id();
        let b = ids.trial_id();
        assert_ne!(a, b);
    }

    #[test]
    fn fixed_clock_pins_timestamp() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let ids = UlidGenerator::new(FixedClock::new(fixed_time));

        let a = ids.trial_id();
        let b = ids.trial_id();
        assert_ne!(a, b);
        assert_eq!(a.as_ulid().timestamp_ms(), fixed_time.timestamp_millis() as u64);
        assert_eq!(b.as_ulid().timestamp_ms(), fixed_time.timestamp_millis() as u64);
        assert!(ids.session_id().to_string().starts_with("session-"));
    }
}
