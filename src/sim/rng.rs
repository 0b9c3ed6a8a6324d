//! Seeded linear congruential sequence generator
//!
//! Every random choice in a round (initial fill, bubble queue, new rows) comes
//! from one of these, so the same seed replays the same round.

use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;
/// Outputs are normalized by 2^32 - 1, so the top state maps to exactly 1.0
const LCG_NORMALIZER: f64 = u32::MAX as f64;

/// Deterministic pseudo-random stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceGenerator {
    seed: u32,
    state: u32,
}

impl SequenceGenerator {
    /// Create a generator; only the low 32 bits of the seed are used
    pub fn new(seed: u64) -> Self {
        let seed = seed as u32;
        Self { seed, state: seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    /// Rewind to the start of the stream
    pub fn reset(&mut self) {
        self.state = self.seed;
    }

    /// Replace both seed and state
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    #[inline]
    fn advance(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    /// Next value in [0, 1]
    pub fn next_uniform(&mut self) -> f64 {
        self.advance() as f64 / LCG_NORMALIZER
    }

    /// Next integer in [min, max] inclusive
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        debug_assert!(min <= max, "next_int: empty range {min}..={max}");
        let span = (max - min + 1) as f64;
        let value = (self.next_uniform() * span).floor() as i64 + min;
        // A uniform of exactly 1.0 would land one past the range
        value.min(max)
    }
}

impl RngCore for SequenceGenerator {
    fn next_u32(&mut self) -> u32 {
        self.advance()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.advance() as u64;
        let lo = self.advance() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.advance().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl SeedableRng for SequenceGenerator {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed) as u64)
    }
}
