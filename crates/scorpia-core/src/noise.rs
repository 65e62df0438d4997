//! Injectable randomness for the kernel
//!
//! The kernel owns exactly one noise source and draws from it in a fixed
//! order: the prior vector once at construction, then one context vector per
//! frame. Same seed + same inputs = same trajectory.

use crate::error::{Error, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

pub trait NoiseSource: Send {
    /// Fill `out` with independent samples from N(mean, std_dev²).
    fn fill_normal(&mut self, mean: f64, std_dev: f64, out: &mut [f64]) -> Result<()>;
}

/// Gaussian noise from a seedable ChaCha stream.
pub struct SeededNoise {
    rng: ChaCha8Rng,
}

impl SeededNoise {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Seeded when `seed` is given, otherwise from OS entropy.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl NoiseSource for SeededNoise {
    fn fill_normal(&mut self, mean: f64, std_dev: f64, out: &mut [f64]) -> Result<()> {
        if !mean.is_finite() {
            return Err(Error::computation("noise"));
        }
        let normal = Normal::new(mean, std_dev).map_err(|_| Error::computation("noise"))?;
        for v in out.iter_mut() {
            *v = normal.sample(&mut self.rng);
        }
        Ok(())
    }
}
