//! Trial records and the append-only trial log.

use serde::{Deserialize, Serialize};

use super::deck::DeckId;
use super::errors::EngineError;

/// Who is taking the task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
}

impl Participant {
    /// Both fields are required. Surrounding whitespace is trimmed and a
    /// blank field counts as missing.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Result<Self, EngineError> {
        let id = id.into().trim().to_string();
        let name = name.into().trim().to_string();
        if id.is_empty() || name.is_empty() {
            return Err(EngineError::MissingParticipantIdentity {
                missing_id: id.is_empty(),
                missing_name: name.is_empty(),
            });
        }
        Ok(Self { id, name })
    }
}

/// Practice trials are never logged, so only these two appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialType {
    Main,
    Final,
}

impl TrialType {
    pub fn as_str(self) -> &'static str {
        match self {
            TrialType::Main => "main",
            TrialType::Final => "final",
        }
    }
}

/// The action written to the log. A timeout is logged as `Pass`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Play,
    Pass,
    End,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Play => "play",
            Action::Pass => "pass",
            Action::End => "end",
        }
    }
}

/// One row of the log.
///
/// `trial_number` and `presented_deck` are `None` only on the final summary.
/// `response_ms` is `None` for timeouts and for the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub participant_id: String,
    pub participant_name: String,
    pub trial_type: TrialType,
    pub trial_number: Option<u32>,
    pub presented_deck: Option<DeckId>,
    pub action: Action,
    pub outcome: i64,
    pub net_worth: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_ms: Option<i64>,
}

impl TrialRecord {
    pub fn main(
        participant: &Participant,
        trial_number: u32,
        presented_deck: DeckId,
        action: Action,
        outcome: i64,
        net_worth: i64,
        response_ms: Option<i64>,
    ) -> Self {
        Self {
            participant_id: participant.id.clone(),
            participant_name: participant.name.clone(),
            trial_type: TrialType::Main,
            trial_number: Some(trial_number),
            presented_deck: Some(presented_deck),
            action,
            outcome,
            net_worth,
            response_ms,
        }
    }

    /// Terminal summary row: action `end`, outcome 0.
    pub fn final_summary(participant: &Participant, net_worth: i64) -> Self {
        Self {
            participant_id: participant.id.clone(),
            participant_name: participant.name.clone(),
            trial_type: TrialType::Final,
            trial_number: None,
            presented_deck: None,
            action: Action::End,
            outcome: 0,
            net_worth,
            response_ms: None,
        }
    }
}

/// Append-only, ordered sequence of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrialLog {
    records: Vec<TrialRecord>,
}

impl TrialLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record at the end. Records are never edited or removed.
    pub fn append(&mut self, record: TrialRecord) {
        self.records.push(record);
    }

    /// All records in append order.
    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&TrialRecord> {
        self.records.last()
    }

    /// Has the terminal summary already been written?
    pub fn is_sealed(&self) -> bool {
        self.last().is_some_and(|r| r.trial_type == TrialType::Final)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn participant() -> Participant {
        Participant::new("p-01", "Ada").unwrap()
    }

    #[rstest]
    #[case("", "Ada", true, false)]
    #[case("p-01", "", false, true)]
    #[case("  ", "\t", true, true)]
    fn participant_requires_id_and_name(
        #[case] id: &str,
        #[case] name: &str,
        #[case] missing_id: bool,
        #[case] missing_name: bool,
    ) {
        let err = Participant::new(id, name).unwrap_err();
        assert!(matches!(
            err,
            EngineError::MissingParticipantIdentity { missing_id: i, missing_name: n }
                if i == missing_id && n == missing_name
        ));
    }

    #[test]
    fn participant_fields_are_trimmed() {
        let p = Participant::new(" 42 ", " Ada ").unwrap();
        assert_eq!(p.id, "42");
        assert_eq!(p.name, "Ada");
    }

    #[test]
    fn log_keeps_append_order_and_seals_on_final() {
        let p = participant();
        let mut log = TrialLog::new();
        log.append(TrialRecord::main(&p, 1, DeckId::DeckC, Action::Play, 50, 2050, Some(812)));
        log.append(TrialRecord::main(&p, 2, DeckId::DeckA, Action::Pass, 0, 2050, None));
        assert!(!log.is_sealed());

        log.append(TrialRecord::final_summary(&p, 2050));
        assert!(log.is_sealed());
        assert_eq!(log.len(), 3);

        let numbers: Vec<_> = log.records().iter().map(|r| r.trial_number).collect();
        assert_eq!(numbers, vec![Some(1), Some(2), None]);
        assert_eq!(log.records()[2].action, Action::End);
        assert_eq!(log.records()[2].outcome, 0);
    }

    #[test]
    fn record_serializes_with_snake_case_labels() {
        let record = TrialRecord::main(&participant(), 3, DeckId::DeckB, Action::Pass, 0, 1900, None);
        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["trial_type"], "main");
        assert_eq!(v["presented_deck"], "deck_b");
        assert_eq!(v["action"], "pass");
        assert!(v.get("response_ms").is_none());
    }
}
