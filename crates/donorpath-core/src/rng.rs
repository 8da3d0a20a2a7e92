//! Random number generator abstraction for determinism.
//!
//! Cosmetic choices such as which donor message template to show go through
//! this trait. Production code injects [`SeededRng`]; tests inject a fixed
//! sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Picks an index into a collection of `len` items. Returns 0 for empty
    /// collections.
    fn pick_index(&mut self, len: usize) -> usize {
        let Some(max) = len.checked_sub(1) else {
            return 0;
        };
        let max = u32::try_from(max).unwrap_or(u32::MAX);
        let picked = self.next_u32_range(0, max);
        usize::try_from(picked).map_or(0, |idx| idx.min(len - 1))
    }
}

/// `StdRng`-backed generator, seeded from the OS or from a fixed value.
#[derive(Debug, Clone)]
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    /// Seeds from operating system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }

    /// Seeds from a fixed value; identical seeds produce identical sequences.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl DeterministicRng for SeededRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.inner.random_range(min..=max)
    }
}
