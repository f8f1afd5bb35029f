//! Deterministic random number generation for synthetic portfolios.
//!
//! RULE: population generation never calls a platform RNG.
//! All randomness flows through `PopulationRng` streams derived
//! from a single master seed.
//!
//! Each stream is seeded from (master_seed XOR slot-mix), so adding a
//! new stream never changes the draws of existing ones.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A deterministic RNG stream.
pub struct PopulationRng {
    inner: Pcg64Mcg,
}

impl PopulationRng {
    /// Create a stream from the master seed and a stable slot.
    pub fn new(master_seed: u64, slot: StreamSlot) -> Self {
        let derived_seed = master_seed ^ ((slot as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15));
        log::debug!("RNG stream '{}' seeded", slot.name());
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll a float in [low, high).
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Pick an index with probability proportional to `weights`.
    /// Falls back to the last index if rounding leaves a remainder.
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        assert!(!weights.is_empty(), "weights must not be empty");
        let total: f64 = weights.iter().sum();
        let mut roll = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if roll < *w {
                return i;
            }
            roll -= w;
        }
        weights.len() - 1
    }

    /// Poisson draw (Knuth). Suitable for the small means used here.
    pub fn poisson(&mut self, lambda: f64) -> u32 {
        let limit = (-lambda).exp();
        let mut k = 0u32;
        let mut p = 1.0;
        loop {
            p *= self.next_f64();
            if p <= limit {
                return k;
            }
            k += 1;
        }
    }

    /// Beta(a, b) for integer shapes: the a-th smallest of (a + b - 1) uniforms.
    pub fn beta_int(&mut self, a: usize, b: usize) -> f64 {
        assert!(a > 0 && b > 0, "beta shapes must be positive");
        let mut draws: Vec<f64> = (0..a + b - 1).map(|_| self.next_f64()).collect();
        draws.sort_by(f64::total_cmp);
        draws[a - 1]
    }
}

/// Stable stream slots.
/// NEVER reorder or remove entries, only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Profile = 0,
    Behavior = 1,
    DataQuality = 2,
    Credit = 3,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Behavior => "behavior",
            Self::DataQuality => "data_quality",
            Self::Credit => "credit",
        }
    }
}
