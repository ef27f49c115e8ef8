//! Decks and outcome generation.
//!
//! Two strategies sit behind the single `DeckModel::draw` contract:
//! - **Scheduled**: a finite card sequence per deck (a base sequence repeated
//!   `repeats` times), shuffled once per block and consumed head-first.
//! - **Sampled**: an independent draw per play against fixed odds
//!   (gain, then loss, then zero payoff).
//!
//! The deck configuration never changes after construction. Only the
//! scheduled piles are consumed, and `reset` refills them.

use std::collections::VecDeque;
use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the four labelled decks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckId {
    DeckA,
    DeckB,
    DeckC,
    DeckD,
}

impl DeckId {
    /// Left-to-right presentation order. The arrow position indexes into this.
    pub const ALL: [DeckId; 4] = [DeckId::DeckA, DeckId::DeckB, DeckId::DeckC, DeckId::DeckD];

    /// Position in `ALL`, i.e. the arrow position that presents this deck.
    pub fn index(self) -> usize {
        match self {
            DeckId::DeckA => 0,
            DeckId::DeckB => 1,
            DeckId::DeckC => 2,
            DeckId::DeckD => 3,
        }
    }

    /// Inverse of `index`. `None` outside `0..4`.
    pub fn from_index(index: usize) -> Option<DeckId> {
        Self::ALL.get(index).copied()
    }

    /// Stable snake_case name, as used in config files and exported logs.
    pub fn label(self) -> &'static str {
        match self {
            DeckId::DeckA => "deck_a",
            DeckId::DeckB => "deck_b",
            DeckId::DeckC => "deck_c",
            DeckId::DeckD => "deck_d",
        }
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per deck, addressed by `DeckId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerDeck<T> {
    pub deck_a: T,
    pub deck_b: T,
    pub deck_c: T,
    pub deck_d: T,
}

impl<T> PerDeck<T> {
    pub fn get(&self, deck: DeckId) -> &T {
        match deck {
            DeckId::DeckA => &self.deck_a,
            DeckId::DeckB => &self.deck_b,
            DeckId::DeckC => &self.deck_c,
            DeckId::DeckD => &self.deck_d,
        }
    }

    pub fn get_mut(&mut self, deck: DeckId) -> &mut T {
        match deck {
            DeckId::DeckA => &mut self.deck_a,
            DeckId::DeckB => &mut self.deck_b,
            DeckId::DeckC => &mut self.deck_c,
            DeckId::DeckD => &mut self.deck_d,
        }
    }

    /// Entries in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = (DeckId, &T)> {
        DeckId::ALL.into_iter().map(move |d| (d, self.get(d)))
    }
}

/// A finite payout schedule: `base` repeated `repeats` times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schedule {
    pub base: Vec<i64>,
    #[serde(default = "default_repeats")]
    pub repeats: usize,
}

fn default_repeats() -> usize {
    3
}

impl Schedule {
    pub fn new(base: Vec<i64>, repeats: usize) -> Self {
        Self { base, repeats }
    }

    /// Number of cards in one full pile.
    pub fn len(&self) -> usize {
        self.base.len() * self.repeats
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The full, unshuffled card sequence.
    pub fn cards(&self) -> Vec<i64> {
        let mut cards = Vec::with_capacity(self.len());
        for _ in 0..self.repeats {
            cards.extend_from_slice(&self.base);
        }
        cards
    }
}

/// Discrete odds for one sampled deck.
///
/// The unit interval is partitioned in order gain, loss, zero payoff:
/// `[0, gain_p)` pays `gain`, `[gain_p, gain_p + loss_p)` pays `loss`,
/// the rest pays 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Odds {
    pub gain: i64,
    pub gain_p: f64,
    pub loss: i64,
    pub loss_p: f64,
    #[serde(default)]
    pub zero_p: f64,
}

impl Odds {
    pub fn new(gain: i64, gain_p: f64, loss: i64, loss_p: f64, zero_p: f64) -> Self {
        Self {
            gain,
            gain_p,
            loss,
            loss_p,
            zero_p,
        }
    }

    /// Map a uniform value in `[0, 1)` onto an outcome.
    pub fn outcome_for(&self, u: f64) -> i64 {
        if u < self.gain_p {
            self.gain
        } else if u < self.gain_p + self.loss_p {
            self.loss
        } else {
            0
        }
    }

    pub fn total_p(&self) -> f64 {
        self.gain_p + self.loss_p + self.zero_p
    }
}

/// Which outcome strategy is active, with its per-deck table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "decks", rename_all = "snake_case")]
pub enum DeckSetup {
    Scheduled(PerDeck<Schedule>),
    Sampled(PerDeck<Odds>),
}

impl DeckSetup {
    /// Classic schedules: ten-card bases repeated three times (30 cards).
    pub fn classic_scheduled() -> Self {
        Self::classic_scheduled_with(3)
    }

    /// Classic ten-card bases, each repeated `repeats` times.
    pub fn classic_scheduled_with(repeats: usize) -> Self {
        DeckSetup::Scheduled(PerDeck {
            deck_a: Schedule::new(vec![100, 100, -50, 100, -200, 100, -100, 100, -150, -250], repeats),
            deck_b: Schedule::new(vec![100, 100, 100, 100, 100, 100, 100, 100, 100, -1150], repeats),
            deck_c: Schedule::new(vec![50, 50, 50, 25, -25, 50, 0, 50, 25, -25], repeats),
            deck_d: Schedule::new(vec![50, 50, 50, 50, 50, 50, 50, 50, 50, -200], repeats),
        })
    }

    /// Classic odds for independent sampling.
    pub fn classic_sampled() -> Self {
        DeckSetup::Sampled(PerDeck {
            deck_a: Odds::new(100, 0.5, -250, 0.5, 0.0),
            deck_b: Odds::new(100, 0.9, -1150, 0.1, 0.0),
            deck_c: Odds::new(50, 0.5, -25, 0.25, 0.25),
            deck_d: Odds::new(50, 0.9, -200, 0.1, 0.0),
        })
    }

    /// Shortest schedule length, or `None` for sampled decks (unbounded).
    pub fn min_schedule_len(&self) -> Option<usize> {
        match self {
            DeckSetup::Scheduled(schedules) => schedules.iter().map(|(_, s)| s.len()).min(),
            DeckSetup::Sampled(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("deck {deck} exhausted after {drawn} draws")]
    Exhausted { deck: DeckId, drawn: usize },
}

/// Outcome source for all four decks.
#[derive(Debug, Clone)]
pub struct DeckModel {
    setup: DeckSetup,
    piles: PerDeck<VecDeque<i64>>,
    drawn: PerDeck<usize>,
}

impl DeckModel {
    /// Build the model and shuffle every scheduled pile.
    pub fn new<R: Rng + ?Sized>(setup: DeckSetup, rng: &mut R) -> Self {
        let mut model = Self {
            setup,
            piles: PerDeck {
                deck_a: VecDeque::new(),
                deck_b: VecDeque::new(),
                deck_c: VecDeque::new(),
                deck_d: VecDeque::new(),
            },
            drawn: PerDeck {
                deck_a: 0,
                deck_b: 0,
                deck_c: 0,
                deck_d: 0,
            },
        };
        model.reset(rng);
        model
    }

    /// Refill scheduled piles with a fresh shuffle of the full sequence.
    /// Sampled decks keep no state, so only the draw counters are cleared.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if let DeckSetup::Scheduled(schedules) = &self.setup {
            for deck in DeckId::ALL {
                let mut cards = schedules.get(deck).cards();
                cards.shuffle(rng);
                *self.piles.get_mut(deck) = cards.into();
            }
        }
        for deck in DeckId::ALL {
            *self.drawn.get_mut(deck) = 0;
        }
    }

    /// Produce the outcome of playing `deck`.
    pub fn draw<R: Rng + ?Sized>(&mut self, deck: DeckId, rng: &mut R) -> Result<i64, DeckError> {
        let drawn = *self.drawn.get(deck);
        let outcome = match &self.setup {
            DeckSetup::Scheduled(_) => self
                .piles
                .get_mut(deck)
                .pop_front()
                .ok_or(DeckError::Exhausted { deck, drawn })?,
            DeckSetup::Sampled(odds) => odds.get(deck).outcome_for(rng.gen_range(0.0..1.0)),
        };
        *self.drawn.get_mut(deck) = drawn + 1;
        Ok(outcome)
    }

    /// Cards left in a scheduled pile; `None` for sampled decks.
    pub fn remaining(&self, deck: DeckId) -> Option<usize> {
        match self.setup {
            DeckSetup::Scheduled(_) => Some(self.piles.get(deck).len()),
            DeckSetup::Sampled(_) => None,
        }
    }

    pub fn drawn(&self, deck: DeckId) -> usize {
        *self.drawn.get(deck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    fn sorted(mut v: Vec<i64>) -> Vec<i64> {
        v.sort_unstable();
        v
    }

    #[rstest]
    #[case(0, DeckId::DeckA)]
    #[case(1, DeckId::DeckB)]
    #[case(2, DeckId::DeckC)]
    #[case(3, DeckId::DeckD)]
    fn deck_index_roundtrips(#[case] index: usize, #[case] deck: DeckId) {
        assert_eq!(DeckId::from_index(index), Some(deck));
        assert_eq!(deck.index(), index);
    }

    #[test]
    fn deck_index_out_of_range_is_none() {
        assert_eq!(DeckId::from_index(4), None);
    }

    #[rstest]
    #[case(0.0, 50)]
    #[case(0.49, 50)]
    #[case(0.5, -25)]
    #[case(0.74, -25)]
    #[case(0.75, 0)]
    #[case(0.99, 0)]
    fn deck_c_odds_partition_gain_loss_zero(#[case] u: f64, #[case] expected: i64) {
        let odds = Odds::new(50, 0.5, -25, 0.25, 0.25);
        assert_eq!(odds.outcome_for(u), expected);
    }

    #[test]
    fn scheduled_draws_consume_exactly_the_repeated_base() {
        let setup = DeckSetup::classic_scheduled();
        let DeckSetup::Scheduled(schedules) = setup.clone() else {
            unreachable!()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let mut model = DeckModel::new(setup, &mut rng);

        for deck in DeckId::ALL {
            let schedule = schedules.get(deck);
            let mut seen = Vec::new();
            for _ in 0..schedule.len() {
                let card = model.draw(deck, &mut rng).unwrap();
                assert!(schedule.base.contains(&card));
                seen.push(card);
            }
            assert_eq!(sorted(seen), sorted(schedule.cards()));
            assert_eq!(model.remaining(deck), Some(0));
        }
    }

    #[test]
    fn scheduled_deck_reports_exhaustion() {
        let setup = DeckSetup::Scheduled(PerDeck {
            deck_a: Schedule::new(vec![1], 1),
            deck_b: Schedule::new(vec![2], 1),
            deck_c: Schedule::new(vec![3], 1),
            deck_d: Schedule::new(vec![4], 1),
        });
        let mut rng = StdRng::seed_from_u64(1);
        let mut model = DeckModel::new(setup, &mut rng);

        assert_eq!(model.draw(DeckId::DeckB, &mut rng), Ok(2));
        assert_eq!(
            model.draw(DeckId::DeckB, &mut rng),
            Err(DeckError::Exhausted {
                deck: DeckId::DeckB,
                drawn: 1
            })
        );
    }

    #[test]
    fn reset_refills_scheduled_piles() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut model = DeckModel::new(DeckSetup::classic_scheduled(), &mut rng);
        for _ in 0..10 {
            model.draw(DeckId::DeckA, &mut rng).unwrap();
        }
        assert_eq!(model.remaining(DeckId::DeckA), Some(20));
        assert_eq!(model.drawn(DeckId::DeckA), 10);

        model.reset(&mut rng);
        assert_eq!(model.remaining(DeckId::DeckA), Some(30));
        assert_eq!(model.drawn(DeckId::DeckA), 0);
    }

    #[test]
    fn sampled_decks_only_pay_configured_amounts() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut model = DeckModel::new(DeckSetup::classic_sampled(), &mut rng);
        for _ in 0..500 {
            let outcome = model.draw(DeckId::DeckB, &mut rng).unwrap();
            assert!(outcome == 100 || outcome == -1150);
        }
        assert_eq!(model.remaining(DeckId::DeckB), None);
        assert_eq!(model.drawn(DeckId::DeckB), 500);
    }

    #[test]
    fn min_schedule_len_is_shortest_deck() {
        assert_eq!(DeckSetup::classic_scheduled().min_schedule_len(), Some(30));
        assert_eq!(DeckSetup::classic_sampled().min_schedule_len(), None);
    }

    #[test]
    fn setup_deserializes_from_tagged_json() {
        let json = serde_json::json!({
            "strategy": "sampled",
            "decks": {
                "deck_a": {"gain": 100, "gain_p": 0.5, "loss": -250, "loss_p": 0.5},
                "deck_b": {"gain": 100, "gain_p": 0.9, "loss": -1150, "loss_p": 0.1},
                "deck_c": {"gain": 50, "gain_p": 0.5, "loss": -25, "loss_p": 0.25, "zero_p": 0.25},
                "deck_d": {"gain": 50, "gain_p": 0.9, "loss": -200, "loss_p": 0.1}
            }
        });
        let setup: DeckSetup = serde_json::from_value(json).unwrap();
        assert_eq!(setup, DeckSetup::classic_sampled());
    }
}
