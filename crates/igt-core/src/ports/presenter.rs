//! Presenter port: everything the engine asks of the display surface.
//!
//! # Call order within a trial
//! 1. `show_board` when the trial is armed
//! 2. `show_feedback` then `show_board` once it resolves
//! 3. `prompt_continue`
//! 4. `clear_feedback` when the participant continues
//!
//! Calls are synchronous and made from the session's event loop; an
//! implementation must not block on participant input.

use crate::domain::{DeckId, EngineError, Feedback, NumeralStyle, Phase};

/// Full-screen views shown between blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Ask for participant id and name.
    Registration,
    /// Task instructions: the response window and the starting stake.
    Welcome { deadline_ms: u64, initial_stake: i64 },
    /// Shown on entering practice; continue starts trial 1.
    PracticeBriefing { trials: u32 },
    /// Shown on entering the main block; net worth has been reset.
    MainBriefing { trials: u32 },
    Ended { final_net_worth: i64 },
}

/// The deck board during a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub phase: Phase,
    /// 1-based within the current block.
    pub trial_number: u32,
    /// Arrow position, an index into `DeckId::ALL`.
    pub position: usize,
    pub net_worth: i64,
    pub previous_net_worth: i64,
    pub numerals: NumeralStyle,
}

impl Board {
    pub fn presented_deck(&self) -> Option<DeckId> {
        DeckId::from_index(self.position)
    }
}

pub trait Presenter: Send {
    /// Replace the display with a full-screen view.
    fn show_screen(&mut self, screen: &Screen);

    /// Redraw the decks, the arrow and the running totals.
    fn show_board(&mut self, board: &Board);

    /// Show the result of the trial under `deck`.
    fn show_feedback(&mut self, deck: DeckId, feedback: Feedback);

    /// Remove the previous trial's feedback before the next trial.
    fn clear_feedback(&mut self);

    /// Ask the participant to press continue.
    fn prompt_continue(&mut self);

    /// Registration was rejected; ask again.
    fn prompt_registration(&mut self, error: &EngineError);
}
