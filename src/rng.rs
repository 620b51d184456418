//! Injectable randomness.
//!
//! Every probabilistic operation in the engine takes a `&mut dyn RngSource`
//! instead of reaching for a global generator, so a fixed seed (or a scripted
//! list of draws) reproduces a battle or a pack opening exactly.

use log::trace;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait RngSource {
    /// Uniform draw in `[0, 1)`. `reason` is only used for tracing.
    fn next_unit(&mut self, reason: &str) -> f64;

    /// Bernoulli trial. A probability of 0 never succeeds, 1 always does.
    fn chance(&mut self, probability: f64, reason: &str) -> bool {
        self.next_unit(reason) < probability
    }

    /// Uniform integer in `[low, high]`, inclusive on both ends.
    fn range_inclusive(&mut self, low: u32, high: u32, reason: &str) -> u32 {
        if high <= low {
            return low;
        }
        let span = (high - low) as u64 + 1;
        let offset = (self.next_unit(reason) * span as f64) as u64;
        low + offset.min(span - 1) as u32
    }

    /// Uniform index into a collection of `len` items. `len` must be non-zero.
    fn pick_index(&mut self, len: usize, reason: &str) -> usize {
        let index = (self.next_unit(reason) * len as f64) as usize;
        index.min(len.saturating_sub(1))
    }

    /// Uniform real number in `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64, reason: &str) -> f64 {
        low + (high - low) * self.next_unit(reason)
    }
}

/// ChaCha-backed generator. Seed it for replayable tests, or use
/// `from_entropy` once at process start.
#[derive(Debug, Clone)]
pub struct SeededRng {
    inner: ChaCha8Rng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }
}

impl RngSource for SeededRng {
    fn next_unit(&mut self, reason: &str) -> f64 {
        let outcome: f64 = self.inner.random();
        trace!("[RNG] Drew {:.4} for: {}", outcome, reason);
        outcome
    }
}

/// A generator that replays a fixed list of unit draws, in order.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    outcomes: Vec<f64>,
    index: usize,
}

impl ScriptedRng {
    pub fn new(outcomes: Vec<f64>) -> Self {
        Self { outcomes, index: 0 }
    }

    /// How many draws have been consumed so far.
    pub fn consumed(&self) -> usize {
        self.index
    }
}

impl RngSource for ScriptedRng {
    fn next_unit(&mut self, reason: &str) -> f64 {
        if self.index >= self.outcomes.len() {
            panic!(
                "ScriptedRng exhausted! Tried to get a value for: '{}'. Need more scripted values.",
                reason
            );
        }
        let outcome = self.outcomes[self.index];
        trace!("[RNG] Consumed {} for: {}", outcome, reason);
        self.index += 1;
        outcome
    }
}
