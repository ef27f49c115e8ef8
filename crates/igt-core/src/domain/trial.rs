//! Trial state machine.
//!
//! State transitions:
//! - Armed -> Resolved (play | pass | deadline)
//! - Resolved -> AwaitingContinue (entered by the controller, no input)
//! - AwaitingContinue -> Closed (continue)
//!
//! The deadline is held as a guard value inside the `Armed` stage. Leaving
//! `Armed` by any path drops the guard, and dropping the guard cancels the
//! timer, so no cancel call has to be remembered by each handler. A fire that
//! was already in flight finds the machine outside `Armed` and is rejected.
//!
//! A closed instance is never reopened; the controller creates a new one for
//! the next trial.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;

use super::deck::{DeckId, DeckModel};
use super::errors::EngineError;
use super::ids::TrialId;
use super::numerals::NumeralStyle;
use super::record::Action;
use super::session::Phase;

/// What resolved a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Play,
    Pass,
    Timeout,
}

impl Trigger {
    /// Logged action. A timeout is recorded as a pass.
    pub fn action(self) -> Action {
        match self {
            Trigger::Play => Action::Play,
            Trigger::Pass | Trigger::Timeout => Action::Pass,
        }
    }
}

/// Anything that can be delivered to a trial instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrialInput {
    Play,
    Pass,
    Timeout,
    Continue,
}

impl From<Trigger> for TrialInput {
    fn from(t: Trigger) -> Self {
        match t {
            Trigger::Play => TrialInput::Play,
            Trigger::Pass => TrialInput::Pass,
            Trigger::Timeout => TrialInput::Timeout,
        }
    }
}

impl fmt::Display for TrialInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrialInput::Play => "play",
            TrialInput::Pass => "pass",
            TrialInput::Timeout => "timeout",
            TrialInput::Continue => "continue",
        };
        f.write_str(s)
    }
}

/// Observable state of a trial instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrialState {
    Armed,
    Resolved,
    AwaitingContinue,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrialError {
    #[error("{input} not accepted while {trial} is {state:?}")]
    NotAccepted {
        trial: TrialId,
        input: TrialInput,
        state: TrialState,
    },

    #[error("{input} received with no trial in progress")]
    NoActiveTrial { input: TrialInput },

    #[error("deadline for {fired_for} fired after that trial was replaced")]
    StaleDeadline { fired_for: TrialId },

    /// A block operation called from a phase the transition table does not
    /// allow it from.
    #[error("{operation} not allowed in phase {}", phase.as_str())]
    WrongPhase { operation: &'static str, phase: Phase },
}

/// Per-deck feedback shown after a trial resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Gain(i64),
    Loss(i64),
    /// A play that drew a zero-payoff card.
    NoChange,
    /// Explicit pass or timeout.
    Passed,
}

impl Feedback {
    pub fn for_resolution(trigger: Trigger, outcome: i64) -> Self {
        match trigger {
            Trigger::Pass | Trigger::Timeout => Feedback::Passed,
            Trigger::Play if outcome > 0 => Feedback::Gain(outcome),
            Trigger::Play if outcome < 0 => Feedback::Loss(-outcome),
            Trigger::Play => Feedback::NoChange,
        }
    }

    pub fn describe(self, numerals: NumeralStyle) -> String {
        match self {
            Feedback::Gain(n) => format!("{} gain", numerals.format_amount(n)),
            Feedback::Loss(n) => format!("{} loss", numerals.format_amount(n)),
            Feedback::NoChange => format!("{} no change", numerals.format_amount(0)),
            Feedback::Passed => "pass".to_string(),
        }
    }
}

/// The result of leaving `Armed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub trial_id: TrialId,
    pub trial_number: u32,
    pub deck: DeckId,
    pub trigger: Trigger,
    pub outcome: i64,
    /// Milliseconds from arming to the response. `None` on timeout.
    pub response_ms: Option<i64>,
}

impl Resolution {
    pub fn action(&self) -> Action {
        self.trigger.action()
    }

    pub fn feedback(&self) -> Feedback {
        Feedback::for_resolution(self.trigger, self.outcome)
    }
}

enum Stage<G> {
    Armed { deadline: G },
    Resolved(Resolution),
    AwaitingContinue(Resolution),
    Closed,
}

/// One trial's lifecycle. `G` is the deadline guard; dropping it cancels the
/// timer.
pub struct TrialStateMachine<G> {
    id: TrialId,
    number: u32,
    deck: DeckId,
    armed_at: DateTime<Utc>,
    stage: Stage<G>,
}

impl<G> TrialStateMachine<G> {
    /// Start a trial in `Armed`, holding the already-scheduled deadline.
    pub fn arm(id: TrialId, number: u32, deck: DeckId, armed_at: DateTime<Utc>, deadline: G) -> Self {
        Self {
            id,
            number,
            deck,
            armed_at,
            stage: Stage::Armed { deadline },
        }
    }

    pub fn id(&self) -> TrialId {
        self.id
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn deck(&self) -> DeckId {
        self.deck
    }

    pub fn state(&self) -> TrialState {
        match self.stage {
            Stage::Armed { .. } => TrialState::Armed,
            Stage::Resolved(_) => TrialState::Resolved,
            Stage::AwaitingContinue(_) => TrialState::AwaitingContinue,
            Stage::Closed => TrialState::Closed,
        }
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        match &self.stage {
            Stage::Resolved(r) | Stage::AwaitingContinue(r) => Some(r),
            _ => None,
        }
    }

    fn reject(&self, input: TrialInput) -> TrialError {
        TrialError::NotAccepted {
            trial: self.id,
            input,
            state: self.state(),
        }
    }

    /// Leave `Armed` with a play, pass or timeout.
    ///
    /// Only a play draws from `decks`. The deadline guard is dropped before
    /// the draw, so a failed draw still cancels the timer (and closes the
    /// trial).
    pub fn resolve<R: Rng + ?Sized>(
        &mut self,
        trigger: Trigger,
        decks: &mut DeckModel,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Resolution, EngineError> {
        if !matches!(self.stage, Stage::Armed { .. }) {
            return Err(self.reject(trigger.into()).into());
        }
        // drops the deadline guard
        self.stage = Stage::Closed;

        let outcome = match trigger {
            Trigger::Play => decks.draw(self.deck, rng)?,
            Trigger::Pass | Trigger::Timeout => 0,
        };
        let response_ms = match trigger {
            Trigger::Timeout => None,
            Trigger::Play | Trigger::Pass => Some((now - self.armed_at).num_milliseconds().max(0)),
        };

        let resolution = Resolution {
            trial_id: self.id,
            trial_number: self.number,
            deck: self.deck,
            trigger,
            outcome,
            response_ms,
        };
        self.stage = Stage::Resolved(resolution.clone());
        Ok(resolution)
    }

    /// `Resolved -> AwaitingContinue`. Called by the controller once the
    /// resolution has been booked; not driven by participant input.
    pub fn enter_awaiting_continue(&mut self) {
        let stage = std::mem::replace(&mut self.stage, Stage::Closed);
        self.stage = match stage {
            Stage::Resolved(r) => Stage::AwaitingContinue(r),
            other => other,
        };
    }

    /// `AwaitingContinue -> Closed`.
    pub fn acknowledge(&mut self) -> Result<Resolution, TrialError> {
        match std::mem::replace(&mut self.stage, Stage::Closed) {
            Stage::AwaitingContinue(r) => Ok(r),
            other => {
                self.stage = other;
                Err(self.reject(TrialInput::Continue))
            }
        }
    }

    /// Tear the trial down from any state, cancelling an outstanding deadline.
    pub fn close(&mut self) {
        self.stage = Stage::Closed;
    }
}

impl<G> fmt::Debug for TrialStateMachine<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrialStateMachine")
            .field("id", &self.id)
            .field("number", &self.number)
            .field("deck", &self.deck)
            .field("state", &self.state())
            .finish()
    }
}
