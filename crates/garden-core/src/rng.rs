//! Deterministic random number generator
//!
//! Uses xorshift64 so a seed yields the same garden on every platform.
//! Node seeding and physics jitter both draw from an injected `GardenRng`;
//! nothing in the simulation touches ambient randomness.

use serde::{Deserialize, Serialize};

/// A deterministic, seedable random number generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GardenRng {
    state: u64,
}

impl GardenRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        // xorshift has a fixed point at zero
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Get the current state
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Generate the next raw u64 value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate a random f64 in range [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        // 53 high bits keep the result strictly below 1.0
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a random f64 in range [min, max)
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Generate a random f64 in range [-magnitude, magnitude)
    pub fn symmetric(&mut self, magnitude: f64) -> f64 {
        self.range_f64(-magnitude, magnitude)
    }

    /// Generate a random index in range [0, len)
    ///
    /// Returns None for an empty range.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some((self.next_u64() % len as u64) as usize)
        }
    }

    /// Pick a random element from a slice
    pub fn pick<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        self.index(slice.len()).map(|i| &slice[i])
    }
}

impl Default for GardenRng {
    fn default() -> Self {
        Self::new(12345)
    }
}
