//! Plain-text presenter on stdout.

use igt_core::domain::{DeckId, EngineError, Feedback, NumeralStyle};
use igt_core::ports::{Board, Presenter, Screen};

pub struct TerminalPresenter {
    numerals: NumeralStyle,
}

impl TerminalPresenter {
    pub fn new(numerals: NumeralStyle) -> Self {
        Self { numerals }
    }

    fn amount(&self, n: i64) -> String {
        self.numerals.format_amount(n)
    }
}

impl Presenter for TerminalPresenter {
    fn show_screen(&mut self, screen: &Screen) {
        let text = match screen {
            Screen::Registration => "Enter participant id and name: <id> <name>".to_string(),
            Screen::Welcome {
                deadline_ms,
                initial_stake,
            } => format!(
                "Welcome. You start with {}.\n\
                 Each trial shows one deck. Press f then Enter to play it, j then Enter to pass.\n\
                 You have {} seconds to answer; no answer counts as a pass.\n\
                 Press Enter to begin the practice round.",
                self.amount(*initial_stake),
                self.amount((*deadline_ms / 1000) as i64),
            ),
            Screen::PracticeBriefing { trials } => format!(
                "Practice: {} trials. Nothing is recorded. Press Enter to start.",
                self.amount(i64::from(*trials))
            ),
            Screen::MainBriefing { trials } => format!(
                "Main round: {} trials. Your total is reset. Press Enter to start.",
                self.amount(i64::from(*trials))
            ),
            Screen::Ended { final_net_worth } => {
                format!("Thank you. Final total: {}", self.amount(*final_net_worth))
            }
        };
        println!("\n{text}");
    }

    fn show_board(&mut self, board: &Board) {
        println!("{}", render_board(board));
    }

    fn show_feedback(&mut self, deck: DeckId, feedback: Feedback) {
        println!("  {deck}: {}", feedback.describe(self.numerals));
    }

    fn clear_feedback(&mut self) {}

    fn prompt_continue(&mut self) {
        println!("  (Enter to continue)");
    }

    fn prompt_registration(&mut self, error: &EngineError) {
        println!("{error}. Enter: <id> <name>");
    }
}

/// One line per board update: trial, decks with the presented one marked,
/// and the running totals.
pub fn render_board(board: &Board) -> String {
    let decks: Vec<String> = DeckId::ALL
        .iter()
        .enumerate()
        .map(|(i, deck)| {
            let label = ["A", "B", "C", "D"][deck.index()];
            if i == board.position {
                format!("[{label}]")
            } else {
                format!(" {label} ")
            }
        })
        .collect();
    format!(
        "{} #{}  {}  total {} (was {})",
        board.phase.as_str(),
        board.numerals.format_amount(i64::from(board.trial_number)),
        decks.join(" "),
        board.numerals.format_amount(board.net_worth),
        board.numerals.format_amount(board.previous_net_worth),
    )
}
