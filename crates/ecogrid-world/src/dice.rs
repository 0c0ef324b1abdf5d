//! Source of every random decision in the simulation.
//!
//! All rolls go through [`Dice`] so that a run can be reproduced from a seed
//! and individual scenarios can pin specific outcomes with [`ScriptedDice`].

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

pub trait Dice {
    /// Uniform integer in `[low, high)`. Returns `low` for an empty range.
    fn int(&mut self, low: i32, high: i32) -> i32;

    /// Uniform real in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Fair coin.
    fn flip(&mut self) -> bool {
        self.int(0, 2) == 1
    }

    /// `true` with probability `1 / n`.
    fn one_in(&mut self, n: i32) -> bool {
        self.int(0, n) == 0
    }
}

/// Seeded ChaCha8 dice used for real runs.
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Dice for SeededDice {
    fn int(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..high)
    }

    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Dice that replay queued values before falling back to a seeded stream.
///
/// Queued integers are returned verbatim (they are not checked against the
/// requested range), which lets scenarios force exact rolls.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    ints: VecDeque<i32>,
    units: VecDeque<f64>,
    fallback: SeededDice,
}

impl ScriptedDice {
    pub fn new(ints: impl IntoIterator<Item = i32>) -> Self {
        Self {
            ints: ints.into_iter().collect(),
            units: VecDeque::new(),
            fallback: SeededDice::new(0),
        }
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = f64>) -> Self {
        self.units.extend(units);
        self
    }

    pub fn push_int(&mut self, value: i32) {
        self.ints.push_back(value);
    }

    /// Number of queued integers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.ints.len()
    }
}

impl Dice for ScriptedDice {
    fn int(&mut self, low: i32, high: i32) -> i32 {
        match self.ints.pop_front() {
            Some(value) => value,
            None => self.fallback.int(low, high),
        }
    }

    fn unit(&mut self) -> f64 {
        match self.units.pop_front() {
            Some(value) => value,
            None => self.fallback.unit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_dice_is_reproducible() {
        let mut a = SeededDice::new(42);
        let mut b = SeededDice::new(42);
        let rolls_a: Vec<i32> = (0..20).map(|_| a.int(0, 100)).collect();
        let rolls_b: Vec<i32> = (0..20).map(|_| b.int(0, 100)).collect();
        assert_eq!(rolls_a, rolls_b);
        assert!(rolls_a.iter().all(|r| (0..100).contains(r)));
    }

    #[test]
    fn test_empty_range_returns_low() {
        let mut dice = SeededDice::new(1);
        assert_eq!(dice.int(3, 3), 3);
        assert_eq!(dice.int(5, 2), 5);
    }

    #[test]
    fn test_scripted_dice_replays_then_falls_back() {
        let mut dice = ScriptedDice::new([7, 1, 0]);
        assert_eq!(dice.int(0, 100), 7);
        assert!(dice.flip());
        assert!(dice.one_in(10));
        assert_eq!(dice.remaining(), 0);

        let roll = dice.int(10, 20);
        assert!((10..20).contains(&roll));
    }
}
