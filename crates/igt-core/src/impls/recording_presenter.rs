//! Presenter that records every call, for tests and headless runs.

use std::sync::{Arc, Mutex};

use crate::domain::{DeckId, EngineError, Feedback};
use crate::ports::{Board, Presenter, Screen};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    Screen(Screen),
    Board(Board),
    Feedback(DeckId, Feedback),
    ClearFeedback,
    PromptContinue,
    PromptRegistration(String),
}

/// Cloning shares the event list, so a test can keep a handle after the
/// presenter has moved into the controller.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    events: Arc<Mutex<Vec<PresenterEvent>>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn screens(&self) -> Vec<Screen> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::Screen(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn last_board(&self) -> Option<Board> {
        self.events().into_iter().rev().find_map(|e| match e {
            PresenterEvent::Board(b) => Some(b),
            _ => None,
        })
    }

    fn push(&self, event: PresenterEvent) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }
}

impl Presenter for RecordingPresenter {
    fn show_screen(&mut self, screen: &Screen) {
        self.push(PresenterEvent::Screen(screen.clone()));
    }

    fn show_board(&mut self, board: &Board) {
        self.push(PresenterEvent::Board(board.clone()));
    }

    fn show_feedback(&mut self, deck: DeckId, feedback: Feedback) {
        self.push(PresenterEvent::Feedback(deck, feedback));
    }

    fn clear_feedback(&mut self) {
        self.push(PresenterEvent::ClearFeedback);
    }

    fn prompt_continue(&mut self) {
        self.push(PresenterEvent::PromptContinue);
    }

    fn prompt_registration(&mut self, error: &EngineError) {
        self.push(PresenterEvent::PromptRegistration(error.to_string()));
    }
}
