//! Integrator - collapses a raw multi-channel signal into one bounded load

use crate::config::KernelConfig;
use crate::types::{RawSignal, CHANNELS};

/// Largest magnitude a load may take. `tanh` rounds to exactly ±1.0 for large
/// inputs in f64, so the output is pinned inside the open interval.
const LOAD_BOUND: f64 = 1.0 - f64::EPSILON;

/// Hard-gated, weighted, tanh-saturated channel integration.
#[derive(Clone, Debug)]
pub struct Integrator {
    weights: [f64; CHANNELS],
    noise_gate: f64,
}

impl Integrator {
    pub fn new(weights: [f64; CHANNELS], noise_gate: f64) -> Self {
        Self { weights, noise_gate }
    }

    pub fn from_config(config: &KernelConfig) -> Self {
        Self::new(config.channel_weights, config.noise_gate)
    }

    /// Integrated load in (-1, 1).
    ///
    /// A channel at or below the gate contributes nothing; above it passes
    /// through unattenuated.
    pub fn integrate(&self, signal: &RawSignal) -> f64 {
        let weighted: f64 = signal
            .as_array()
            .iter()
            .zip(self.weights.iter())
            .map(|(&v, &w)| if v > self.noise_gate { v * w } else { 0.0 })
            .sum();
        weighted.tanh().clamp(-LOAD_BOUND, LOAD_BOUND)
    }

    pub fn weights(&self) -> &[f64; CHANNELS] {
        &self.weights
    }

    pub fn noise_gate(&self) -> f64 {
        self.noise_gate
    }
}

impl Default for Integrator {
    fn default() -> Self {
        Self::from_config(&KernelConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(values: [f64; 4]) -> RawSignal {
        RawSignal::new(values).unwrap()
    }

    #[test]
    fn test_zero_signal_is_zero_load() {
        assert_eq!(Integrator::default().integrate(&signal([0.0; 4])), 0.0);
    }

    #[test]
    fn test_gate_threshold_is_exclusive() {
        let integrator = Integrator::default();
        assert_eq!(integrator.integrate(&signal([0.2, 0.2, 0.2, 0.2])), 0.0);
        assert!(integrator.integrate(&signal([0.0, 0.2001, 0.0, 0.0])) > 0.0);
    }

    #[test]
    fn test_gate_is_hard_cutoff() {
        let integrator = Integrator::default();
        let load = integrator.integrate(&signal([0.0, 0.5, 0.0, 0.0]));
        assert!((load - (0.5f64 * 0.45).tanh()).abs() < 1e-12);
    }

    #[test]
    fn test_reference_frame_load() {
        // 0.2 on proprioceptive is gated out
        let load = Integrator::default().integrate(&signal([0.9, 0.5, 0.2, 0.95]));
        let expected = (0.9 * 0.05 + 0.5 * 0.45 + 0.95 * 0.05f64).tanh();
        assert!((load - expected).abs() < 1e-12);
    }

    #[test]
    fn test_huge_input_stays_inside_open_interval() {
        let integrator = Integrator::default();
        let load = integrator.integrate(&signal([1e9, 1e9, 1e9, 1e9]));
        assert!(load < 1.0);
        let load = Integrator::new([-1.0; 4], 0.2).integrate(&signal([1e9; 4]));
        assert!(load > -1.0);
    }
}
