//! Injectable randomness.
//!
//! RULE: Nothing in the engine may call a platform RNG directly.
//! Every random draw flows through a `RandomSource` handed in by the
//! caller, so the deterministic arithmetic of a turn can be exercised
//! with a scripted or silent source.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::collections::VecDeque;

/// A source of uniform draws.
pub trait RandomSource {
    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64;

    /// Roll an integer in [0, n).
    fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        ((self.next_f64() * n as f64) as u64).min(n - 1)
    }

    /// Bernoulli trial: returns true with probability p.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Reproducible PCG stream. Same seed, same draws.
pub struct SeededRng {
    seed:  u64,
    inner: Pcg64Mcg,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Seed from OS entropy. Used for casual play where no replay is needed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRng {
    fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }
}

/// Replays a fixed sequence of rolls, then repeats `fallback` forever.
///
/// The event draw consumes one roll for "does anything happen" and, when
/// it fires, one more roll to pick the catalog entry.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    rolls:    VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRng {
    pub fn new(rolls: impl IntoIterator<Item = f64>) -> Self {
        Self {
            rolls:    rolls.into_iter().collect(),
            fallback: 0.999,
        }
    }

    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl RandomSource for ScriptedRng {
    fn next_f64(&mut self) -> f64 {
        self.rolls.pop_front().unwrap_or(self.fallback)
    }
}

/// A source under which no random event ever fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvents;

impl RandomSource for NoEvents {
    fn next_f64(&mut self) -> f64 {
        0.0
    }

    fn chance(&mut self, _p: f64) -> bool {
        false
    }
}
