//! Session configuration.
//!
//! Everything the engine needs from setup except participant identity,
//! which is collected at registration. Loaded from JSON; every field has a
//! default.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::deck::{DeckId, DeckSetup};
use super::numerals::NumeralStyle;

const PROBABILITY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("deck {deck} schedule has {len} cards but {required} trials need drawing")]
    DeckExhausted {
        deck: DeckId,
        len: usize,
        required: u32,
    },

    #[error("deck {deck} has an empty schedule")]
    EmptySchedule { deck: DeckId },

    #[error("deck {deck} probability {field}={value} outside [0, 1]")]
    ProbabilityOutOfRange {
        deck: DeckId,
        field: &'static str,
        value: f64,
    },

    #[error("deck {deck} probabilities sum to {sum}, expected 1")]
    ProbabilitiesDoNotSumToOne { deck: DeckId, sum: f64 },

    #[error("main_trials must be at least 1")]
    NoMainTrials,

    #[error("deadline_ms must be greater than 0")]
    ZeroDeadline,

    #[error("initial_position {0} is not a deck index")]
    InitialPositionOutOfRange(usize),

    #[error("failed to parse config: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub initial_stake: i64,
    pub practice_trials: u32,
    pub main_trials: u32,
    pub deadline_ms: u64,
    /// Arrow position for the very first trial.
    pub initial_position: usize,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
    pub numerals: NumeralStyle,
    pub decks: DeckSetup,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::scheduled()
    }
}

impl SessionConfig {
    /// Finite shuffled schedules with a 120-trial main block. Every pile
    /// holds 120 cards so any sequence of presented decks can be drawn.
    pub fn scheduled() -> Self {
        Self {
            initial_stake: 2000,
            practice_trials: 10,
            main_trials: 120,
            deadline_ms: 4000,
            initial_position: 0,
            seed: None,
            numerals: NumeralStyle::Western,
            decks: DeckSetup::classic_scheduled_with(12),
        }
    }

    /// Independent sampling with a 20-trial main block.
    pub fn sampled() -> Self {
        Self {
            main_trials: 20,
            decks: DeckSetup::classic_sampled(),
            ..Self::scheduled()
        }
    }

    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    /// Fail fast on anything that would otherwise break mid-session.
    ///
    /// Scheduled decks are refilled when the main block starts, so each pile
    /// only has to cover the longer of the two blocks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.main_trials == 0 {
            return Err(ConfigError::NoMainTrials);
        }
        if self.deadline_ms == 0 {
            return Err(ConfigError::ZeroDeadline);
        }
        if DeckId::from_index(self.initial_position).is_none() {
            return Err(ConfigError::InitialPositionOutOfRange(self.initial_position));
        }

        match &self.decks {
            DeckSetup::Scheduled(schedules) => {
                let required = self.practice_trials.max(self.main_trials);
                for (deck, schedule) in schedules.iter() {
                    if schedule.is_empty() {
                        return Err(ConfigError::EmptySchedule { deck });
                    }
                    if schedule.len() < required as usize {
                        return Err(ConfigError::DeckExhausted {
                            deck,
                            len: schedule.len(),
                            required,
                        });
                    }
                }
            }
            DeckSetup::Sampled(odds) => {
                for (deck, o) in odds.iter() {
                    for (field, value) in [("gain_p", o.gain_p), ("loss_p", o.loss_p), ("zero_p", o.zero_p)] {
                        if !(0.0..=1.0).contains(&value) {
                            return Err(ConfigError::ProbabilityOutOfRange { deck, field, value });
                        }
                    }
                    let sum = o.total_p();
                    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
                        return Err(ConfigError::ProbabilitiesDoNotSumToOne { deck, sum });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deck::{Odds, PerDeck, Schedule};
    use rstest::rstest;

    #[rstest]
    #[case(SessionConfig::scheduled())]
    #[case(SessionConfig::sampled())]
    fn presets_are_valid(#[case] config: SessionConfig) {
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.initial_stake, 2000);
        assert_eq!(config.deadline(), Duration::from_secs(4));
    }

    #[test]
    fn too_many_main_trials_for_schedule_fails_at_setup() {
        let config = SessionConfig {
            main_trials: 31,
            decks: DeckSetup::classic_scheduled(),
            ..SessionConfig::scheduled()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::DeckExhausted {
                deck: DeckId::DeckA,
                len: 30,
                required: 31
            })
        );
    }

    #[test]
    fn practice_block_also_bounded_by_schedule() {
        let short = Schedule::new(vec![1, 2], 2);
        let config = SessionConfig {
            practice_trials: 5,
            main_trials: 4,
            decks: DeckSetup::Scheduled(PerDeck {
                deck_a: short.clone(),
                deck_b: short.clone(),
                deck_c: short.clone(),
                deck_d: short,
            }),
            ..SessionConfig::scheduled()
        };
        assert!(matches!(config.validate(), Err(ConfigError::DeckExhausted { required: 5, .. })));
    }

    #[rstest]
    #[case(Schedule::new(Vec::new(), 3))]
    #[case(Schedule::new(vec![50, -25], 0))]
    fn empty_schedule_is_rejected(#[case] empty: Schedule) {
        let mut config = SessionConfig::scheduled();
        if let DeckSetup::Scheduled(schedules) = &mut config.decks {
            schedules.deck_b = empty;
        }
        assert_eq!(config.validate(), Err(ConfigError::EmptySchedule { deck: DeckId::DeckB }));
    }

    #[test]
    fn sampled_decks_have_no_length_limit() {
        let config = SessionConfig {
            main_trials: 10_000,
            ..SessionConfig::sampled()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn probabilities_must_sum_to_one() {
        let mut config = SessionConfig::sampled();
        if let DeckSetup::Sampled(odds) = &mut config.decks {
            odds.deck_d = Odds::new(50, 0.9, -200, 0.2, 0.0);
        }
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilitiesDoNotSumToOne { deck: DeckId::DeckD, .. })
        ));
    }

    #[test]
    fn negative_probability_is_rejected() {
        let mut config = SessionConfig::sampled();
        if let DeckSetup::Sampled(odds) = &mut config.decks {
            odds.deck_a = Odds::new(100, 1.5, -250, -0.5, 0.0);
        }
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange { deck: DeckId::DeckA, field: "gain_p", .. })
        ));
    }

    #[rstest]
    #[case(SessionConfig { main_trials: 0, ..SessionConfig::sampled() }, ConfigError::NoMainTrials)]
    #[case(SessionConfig { deadline_ms: 0, ..SessionConfig::sampled() }, ConfigError::ZeroDeadline)]
    #[case(SessionConfig { initial_position: 4, ..SessionConfig::sampled() }, ConfigError::InitialPositionOutOfRange(4))]
    fn scalar_fields_are_checked(#[case] config: SessionConfig, #[case] expected: ConfigError) {
        assert_eq!(config.validate(), Err(expected));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = SessionConfig::from_json(r#"{"main_trials": 20, "numerals": "persian", "seed": 9}"#).unwrap();
        assert_eq!(config.main_trials, 20);
        assert_eq!(config.numerals, NumeralStyle::Persian);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.practice_trials, 10);
        assert_eq!(config.decks, DeckSetup::classic_scheduled_with(12));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            SessionConfig::from_json(r#"{"timeout": 4}"#),
            Err(ConfigError::Parse(_))
        ));
    }
}
