//! Domain model: decks, trials, session state, records, configuration.

pub mod config;
pub mod deck;
pub mod errors;
pub mod ids;
pub mod numerals;
pub mod record;
pub mod session;
pub mod trial;

pub use config::{ConfigError, SessionConfig};
pub use deck::{DeckError, DeckId, DeckModel, DeckSetup, Odds, PerDeck, Schedule};
pub use errors::{EngineError, ExportError};
pub use ids::{SessionId, TrialId};
pub use numerals::NumeralStyle;
pub use record::{Action, Participant, TrialLog, TrialRecord, TrialType};
pub use session::{Phase, PhaseEvent, Session};
pub use trial::{Feedback, Resolution, TrialError, TrialInput, TrialState, TrialStateMachine, Trigger};
