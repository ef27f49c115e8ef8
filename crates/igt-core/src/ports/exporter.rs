//! Exporter port: persists a completed trial log.

use crate::domain::{ExportError, Participant, TrialRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    /// Where the records went (file path, or a label for in-memory sinks).
    pub location: String,
    /// Records written, final summary included.
    pub rows: usize,
}

/// Implementations must not assume the session can be retried: a failure is
/// reported to the operator and the in-memory log stays as it is.
pub trait Exporter: Send + Sync {
    /// Persist the whole log, final summary included, for one participant.
    fn export(&self, participant: &Participant, records: &[TrialRecord]) -> Result<ExportReceipt, ExportError>;
}

impl<E: Exporter + ?Sized> Exporter for std::sync::Arc<E> {
    fn export(&self, participant: &Participant, records: &[TrialRecord]) -> Result<ExportReceipt, ExportError> {
        (**self).export(participant, records)
    }
}
