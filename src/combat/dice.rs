//! Dice rolling
//!
//! Every random outcome in a turn comes from a `Dice` handed in by the caller,
//! so tests can force exact rolls and replays can reuse a seed.

use rand::Rng;
use std::collections::VecDeque;

/// Source of uniform dice rolls
pub trait Dice {
    /// Roll a die with `sides` faces, returning a value in `1..=sides`
    ///
    /// A zero-sided die is treated as one-sided.
    fn roll(&mut self, sides: u32) -> u32;
}

/// Dice backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RngDice<R> {
    rng: R,
}

impl<R: Rng> RngDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngDice<rand::rngs::StdRng> {
    /// Entropy-seeded dice for normal play
    pub fn from_entropy() -> Self {
        use rand::SeedableRng;
        Self::new(rand::rngs::StdRng::from_entropy())
    }
}

impl RngDice<rand_chacha::ChaCha8Rng> {
    /// Reproducible dice for replays and tests
    pub fn seeded(seed: u64) -> Self {
        use rand_chacha::rand_core::SeedableRng;
        Self::new(rand_chacha::ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Dice for RngDice<R> {
    fn roll(&mut self, sides: u32) -> u32 {
        self.rng.gen_range(1..=sides.max(1))
    }
}

/// Replays a fixed list of rolls in order
///
/// Each scripted value is clamped into the die's range. Once the script is
/// exhausted every roll returns 1.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<u32>,
    consumed: usize,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Append more rolls to the end of the script
    pub fn push(&mut self, roll: u32) {
        self.rolls.push_back(roll);
    }

    /// Rolls left in the script
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }

    /// Rolls taken so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, sides: u32) -> u32 {
        let sides = sides.max(1);
        self.consumed += 1;
        match self.rolls.pop_front() {
            Some(value) => value.clamp(1, sides),
            None => {
                tracing::warn!("Dice script exhausted, rolling 1 on d{}", sides);
                1
            }
        }
    }
}
