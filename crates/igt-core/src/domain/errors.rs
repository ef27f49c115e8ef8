//! Engine errors.
//!
//! Classification:
//! - invariant violations (`DeckExhausted`, `Config`): a defect, fail fast
//! - expected races (`InvalidInputForState`): absorbed by the controller
//! - operator/participant visible (`ExportFailure`, `MissingParticipantIdentity`)

use thiserror::Error;

use super::config::ConfigError;
use super::deck::{DeckError, DeckId};
use super::trial::TrialError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("deck {deck} exhausted after {drawn} draws; schedule shorter than the configured trial count")]
    DeckExhausted { deck: DeckId, drawn: usize },

    #[error(transparent)]
    InvalidInputForState(#[from] TrialError),

    #[error("export failed: {0}")]
    ExportFailure(#[from] ExportError),

    #[error("participant identity incomplete (missing id: {missing_id}, missing name: {missing_name})")]
    MissingParticipantIdentity { missing_id: bool, missing_name: bool },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl From<DeckError> for EngineError {
    fn from(err: DeckError) -> Self {
        match err {
            DeckError::Exhausted { deck, drawn } => EngineError::DeckExhausted { deck, drawn },
        }
    }
}

impl EngineError {
    /// Is this an expected human-timing race that should be silently ignored?
    pub fn is_stray_input(&self) -> bool {
        matches!(self, EngineError::InvalidInputForState(_))
    }
}

/// Failure reported by an `Exporter`.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Other(String),
}
