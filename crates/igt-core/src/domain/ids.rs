//! Strongly-typed identifiers.
//!
//! Sessions and trials are both identified by a ULID, wrapped in a
//! phantom-typed `Id<T>` so a `TrialId` can never be passed where a
//! `SessionId` is expected.
//!
//! `TrialId` is what makes a stale deadline fire recognisable: a timer
//! armed for one trial instance carries that instance's id, and the
//! controller drops the fire if the id no longer matches.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// Marker trait supplying the display prefix of each id type.
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Session {}

impl IdMarker for Session {
    fn prefix() -> &'static str {
        "session-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Trial {}

impl IdMarker for Trial {
    fn prefix() -> &'static str {
        "trial-"
    }
}

/// Identifier of one participant session (one run of the task).
pub type SessionId = Id<Session>;

/// Identifier of one trial instance (one armed deadline, one resolution).
pub type TrialId = Id<Trial>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_type_prefix() {
        let session = SessionId::from_ulid(Ulid::new());
        let trial = TrialId::from_ulid(Ulid::new());

        assert!(session.to_string().starts_with("session-"));
        assert!(trial.to_string().starts_with("trial-"));
    }

    #[test]
    fn ids_with_same_ulid_compare_equal() {
        let ulid = Ulid::new();
        let a: TrialId = ulid.into();
        let b = TrialId::from_ulid(ulid);
        assert_eq!(a, b);
        assert_eq!(a.as_ulid(), ulid);
    }

    #[test]
    fn phantom_marker_is_zero_sized() {
        use std::mem::size_of;
        assert_eq!(size_of::<TrialId>(), size_of::<Ulid>());
    }
}
