//! Sources of random numbers for stochastic rules.
use std::fmt;

use rand::FromEntropy;
use rand::Rng;
use rand::SeedableRng;

/// Produces random numbers in `[0, 1)`.
pub trait RandomSource: fmt::Debug {
    /// The next random number, in `[0, 1)`.
    fn next_f64(&mut self) -> f64;
}

/// A pseudo-random number generator.
#[derive(Clone, Debug)]
pub struct StdRandom {
    rng: rand::rngs::StdRng,
}

/// Always produces the same number.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fixed(pub f64);

/// Cycles through a list of numbers.
#[derive(Clone, Debug, PartialEq)]
pub struct Sequence {
    values: Vec<f64>,
    index: usize,
}

impl StdRandom {
    /// A generator that produces the same numbers for the same seed.
    pub fn seeded(seed: u64) -> Self {
        let rng = rand::rngs::StdRng::seed_from_u64(seed);
        StdRandom { rng }
    }

    /// A generator seeded by the operating system.
    pub fn from_entropy() -> Self {
        let rng = rand::rngs::StdRng::from_entropy();
        StdRandom { rng }
    }
}

impl RandomSource for StdRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen()
    }
}

impl RandomSource for Fixed {
    fn next_f64(&mut self) -> f64 {
        self.0
    }
}

impl Sequence {
    /// Creates a source that returns `values` in order, starting over at the end.
    ///
    /// An empty sequence always produces zero.
    pub fn new(values: Vec<f64>) -> Self {
        let index = 0;
        Sequence { values, index }
    }
}

impl RandomSource for Sequence {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.index % self.values.len()];
        self.index += 1;
        value
    }
}
