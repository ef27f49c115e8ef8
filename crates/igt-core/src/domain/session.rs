//! Session state and phase sequencing.

use serde::{Deserialize, Serialize};

/// Where the session is.
///
/// Transition table (`Phase::next`):
/// - Registration --Registered--> Welcome
/// - Welcome --Continue--> Practice
/// - Practice --BlockComplete--> Main
/// - Main --BlockComplete--> Ended
/// - any non-ended phase --Quit--> Ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Registration,
    Welcome,
    Practice,
    Main,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseEvent {
    Registered,
    Continue,
    BlockComplete,
    Quit,
}

impl Phase {
    pub fn next(self, event: PhaseEvent) -> Option<Phase> {
        use Phase::*;
        use PhaseEvent::*;
        match (self, event) {
            (Registration, Registered) => Some(Welcome),
            (Welcome, Continue) => Some(Practice),
            (Practice, BlockComplete) => Some(Main),
            (Main, BlockComplete) => Some(Ended),
            (Ended, Quit) => None,
            (_, Quit) => Some(Ended),
            _ => None,
        }
    }

    /// Phases that run trials.
    pub fn is_block(self) -> bool {
        matches!(self, Phase::Practice | Phase::Main)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Registration => "registration",
            Phase::Welcome => "welcome",
            Phase::Practice => "practice",
            Phase::Main => "main",
            Phase::Ended => "ended",
        }
    }
}

/// Session-level bookkeeping. Only `SessionController` mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub phase: Phase,
    pub net_worth: i64,
    /// Net worth before the last resolved trial.
    pub previous_net_worth: i64,
    /// Index into `DeckId::ALL` of the presented deck.
    pub position: usize,
    /// Trials started in the current block. Reset on entering a block.
    pub trial_counter: u32,
    /// Set once the main block has been entered; never cleared. Trials are
    /// written to the log only while it is set.
    pub logging_active: bool,
}

impl Session {
    pub fn new(initial_stake: i64, initial_position: usize) -> Self {
        Self {
            phase: Phase::Registration,
            net_worth: initial_stake,
            previous_net_worth: initial_stake,
            position: initial_position,
            trial_counter: 0,
            logging_active: false,
        }
    }

    /// Book one resolved trial. The only place net worth changes inside a
    /// block.
    pub fn apply_outcome(&mut self, outcome: i64) {
        self.previous_net_worth = self.net_worth;
        self.net_worth += outcome;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Phase::Registration, PhaseEvent::Registered, Some(Phase::Welcome))]
    #[case(Phase::Welcome, PhaseEvent::Continue, Some(Phase::Practice))]
    #[case(Phase::Practice, PhaseEvent::BlockComplete, Some(Phase::Main))]
    #[case(Phase::Main, PhaseEvent::BlockComplete, Some(Phase::Ended))]
    #[case(Phase::Practice, PhaseEvent::Quit, Some(Phase::Ended))]
    #[case(Phase::Registration, PhaseEvent::Quit, Some(Phase::Ended))]
    #[case(Phase::Ended, PhaseEvent::Quit, None)]
    #[case(Phase::Ended, PhaseEvent::Continue, None)]
    #[case(Phase::Registration, PhaseEvent::Continue, None)]
    #[case(Phase::Practice, PhaseEvent::Continue, None)]
    #[case(Phase::Welcome, PhaseEvent::BlockComplete, None)]
    fn transition_table(#[case] from: Phase, #[case] event: PhaseEvent, #[case] to: Option<Phase>) {
        assert_eq!(from.next(event), to);
    }

    #[test]
    fn only_practice_and_main_run_trials() {
        assert!(Phase::Main.is_block());
        assert!(Phase::Practice.is_block());
        assert!(!Phase::Welcome.is_block());
    }

    #[test]
    fn apply_outcome_tracks_previous() {
        let mut s = Session::new(2000, 0);
        s.apply_outcome(50);
        assert_eq!((s.previous_net_worth, s.net_worth), (2000, 2050));
        s.apply_outcome(0);
        assert_eq!((s.previous_net_worth, s.net_worth), (2050, 2050));
        s.apply_outcome(-1150);
        assert_eq!((s.previous_net_worth, s.net_worth), (2050, 900));
    }
}
