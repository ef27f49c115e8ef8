//! CSV exporter: one `Participant_<id>.csv` per participant.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::domain::{ExportError, NumeralStyle, Participant, TrialRecord};
use crate::ports::{ExportReceipt, Exporter};

#[derive(Debug, Serialize)]
struct Row<'a> {
    #[serde(rename = "Participant ID")]
    participant_id: &'a str,
    #[serde(rename = "Participant Name")]
    participant_name: &'a str,
    #[serde(rename = "Trial Type")]
    trial_type: &'static str,
    #[serde(rename = "Trial Number")]
    trial_number: String,
    #[serde(rename = "Presented Deck")]
    presented_deck: &'static str,
    #[serde(rename = "Choice")]
    choice: &'static str,
    #[serde(rename = "Outcome")]
    outcome: String,
    #[serde(rename = "Net Worth")]
    net_worth: String,
    #[serde(rename = "Response ms")]
    response_ms: String,
}

impl<'a> Row<'a> {
    fn new(record: &'a TrialRecord, numerals: NumeralStyle) -> Self {
        let outcome = if record.outcome == 0 {
            "0".to_string()
        } else {
            numerals.format_amount(record.outcome)
        };
        Self {
            participant_id: &record.participant_id,
            participant_name: &record.participant_name,
            trial_type: record.trial_type.as_str(),
            trial_number: record
                .trial_number
                .map(|n| numerals.format_amount(n.into()))
                .unwrap_or_default(),
            presented_deck: record.presented_deck.map(|d| d.label()).unwrap_or("none"),
            choice: record.action.as_str(),
            outcome,
            net_worth: numerals.format_amount(record.net_worth),
            response_ms: record.response_ms.map(|ms| ms.to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
    numerals: NumeralStyle,
}

impl CsvExporter {
    pub fn new(output_dir: impl Into<PathBuf>, numerals: NumeralStyle) -> Self {
        Self {
            output_dir: output_dir.into(),
            numerals,
        }
    }

    pub fn path_for(&self, participant_id: &str) -> PathBuf {
        self.output_dir
            .join(format!("Participant_{}.csv", file_safe(participant_id)))
    }
}

/// Keep `[A-Za-z0-9_-]` and percent-encode every other UTF-8 byte, `%`
/// included, so distinct ids never share a file.
fn file_safe(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn io_error(path: &Path, source: std::io::Error) -> ExportError {
    ExportError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl Exporter for CsvExporter {
    fn export(&self, participant: &Participant, records: &[TrialRecord]) -> Result<ExportReceipt, ExportError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| io_error(&self.output_dir, e))?;

        let path = self.path_for(&participant.id);
        let mut writer = csv::Writer::from_path(&path)?;
        for record in records {
            writer.serialize(Row::new(record, self.numerals))?;
        }
        writer.flush().map_err(|e| io_error(&path, e))?;

        info!(path = %path.display(), rows = records.len(), "trial log written");
        Ok(ExportReceipt {
            location: path.display().to_string(),
            rows: records.len(),
        })
    }
}
