//! Plasticity unit - Hebbian rewiring of a square synapse matrix
//!
//! Each adapt adds `base_rate * (1 + error) * a ⊗ a` to the matrix, then
//! divides the whole matrix by its largest absolute entry. After every
//! successful adapt, `max |w| <= 1.0`.

use crate::error::{ensure_finite, Error, Result};
use tracing::warn;

/// Dense row-major square matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct SynapseMatrix {
    dims: usize,
    weights: Vec<f64>,
}

impl SynapseMatrix {
    pub fn identity(dims: usize) -> Result<Self> {
        let mut weights = vec![0.0; entry_count(dims)?];
        for i in 0..dims {
            weights[i * dims + i] = 1.0;
        }
        Ok(Self { dims, weights })
    }

    /// Build from row-major weights of length `dims * dims`.
    pub fn from_row_major(dims: usize, weights: Vec<f64>) -> Result<Self> {
        let expected = entry_count(dims)?;
        if weights.len() != expected {
            return Err(Error::dimension_mismatch(expected, weights.len()));
        }
        ensure_finite("plasticity.init", &weights)?;
        Ok(Self { dims, weights })
    }

    #[inline]
    pub fn dims(&self) -> usize {
        self.dims
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.weights[row * self.dims + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.weights[row * self.dims..(row + 1) * self.dims]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }

    /// Largest absolute entry, 0.0 for an all-zero matrix.
    pub fn max_abs(&self) -> f64 {
        self.weights.iter().fold(0.0f64, |m, w| m.max(w.abs()))
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.weights.chunks(self.dims.max(1)).map(<[f64]>::to_vec).collect()
    }
}

fn entry_count(dims: usize) -> Result<usize> {
    dims.checked_mul(dims)
        .ok_or_else(|| Error::config(format!("dims {} overflows the synapse matrix", dims)))
}

/// What renormalization did on the last adapt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Renormalization {
    /// Every entry was divided by `divisor`.
    Applied { divisor: f64 },
    /// The matrix was all zero; division skipped.
    Skipped,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlasticityUnit {
    synapses: SynapseMatrix,
    base_rate: f64,
}

impl PlasticityUnit {
    /// Identity-initialised unit.
    pub fn new(dims: usize, base_rate: f64) -> Result<Self> {
        Ok(Self {
            synapses: SynapseMatrix::identity(dims)?,
            base_rate,
        })
    }

    pub fn with_synapses(synapses: SynapseMatrix, base_rate: f64) -> Self {
        Self { synapses, base_rate }
    }

    /// Hebbian co-activation update followed by global renormalization.
    ///
    /// The matrix is only replaced once the whole update is finite; on error
    /// it is left untouched.
    pub fn adapt(&mut self, activation: &[f64], error_magnitude: f64) -> Result<Renormalization> {
        let n = self.synapses.dims;
        if activation.len() != n {
            return Err(Error::dimension_mismatch(n, activation.len()));
        }
        if !error_magnitude.is_finite() || error_magnitude < 0.0 {
            return Err(Error::computation("plasticity.adapt"));
        }

        let gain = self.base_rate * (1.0 + error_magnitude);
        let mut next = self.synapses.weights.clone();
        for (i, &ai) in activation.iter().enumerate() {
            let scaled = gain * ai;
            for (w, &aj) in next[i * n..(i + 1) * n].iter_mut().zip(activation) {
                *w += scaled * aj;
            }
        }
        ensure_finite("plasticity.adapt", &next)?;

        let divisor = next.iter().fold(0.0f64, |m, w| m.max(w.abs()));
        let outcome = if divisor > 0.0 {
            for w in next.iter_mut() {
                *w /= divisor;
            }
            Renormalization::Applied { divisor }
        } else {
            warn!("Synapse matrix is all zero, skipping renormalization");
            Renormalization::Skipped
        };

        self.synapses.weights = next;
        Ok(outcome)
    }

    pub fn synapses(&self) -> &SynapseMatrix {
        &self.synapses
    }

    pub fn base_rate(&self) -> f64 {
        self.base_rate
    }
}
