//! In-memory exporter.

use std::sync::Mutex;

use crate::domain::{ExportError, Participant, TrialRecord};
use crate::ports::{ExportReceipt, Exporter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedBatch {
    pub participant: Participant,
    pub records: Vec<TrialRecord>,
}

/// Keeps every exported batch. `failing` builds one that always errors.
#[derive(Debug, Default)]
pub struct MemoryExporter {
    batches: Mutex<Vec<ExportedBatch>>,
    fail_with: Option<String>,
}

impl MemoryExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            fail_with: Some(message.into()),
        }
    }

    pub fn batches(&self) -> Vec<ExportedBatch> {
        self.batches.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Exporter for MemoryExporter {
    fn export(&self, participant: &Participant, records: &[TrialRecord]) -> Result<ExportReceipt, ExportError> {
        if let Some(message) = &self.fail_with {
            return Err(ExportError::Other(message.clone()));
        }
        self.batches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ExportedBatch {
                participant: participant.clone(),
                records: records.to_vec(),
            });
        Ok(ExportReceipt {
            location: format!("memory:{}", participant.id),
            rows: records.len(),
        })
    }
}
