//! Kernel configuration
//!
//! Every tunable constant of the frame loop lives here. Loaded from TOML at
//! startup, falls back to defaults if no config file exists.

use crate::error::{Error, Result};
use crate::types::CHANNELS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Largest supported vector length; the synapse matrix holds `dims²` entries.
pub const MAX_DIMS: usize = 4096;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Length of the context vector, the prior vector, and each side of the synapse matrix.
    pub dims: usize,
    /// Integration weight per channel: auditory, visual, proprioceptive, social.
    pub channel_weights: [f64; CHANNELS],
    /// Channel values at or below this are zeroed before weighting.
    pub noise_gate: f64,
    /// Standard deviation of the context samples around the integrated load.
    pub context_std: f64,
    /// Standard deviation of the initial prior vector (mean 0).
    pub prior_init_std: f64,
    /// Forecaster step size.
    pub learning_rate: f64,
    /// Hebbian base rate, scaled by `1 + error` on each adapt.
    pub base_plasticity_rate: f64,
    /// Error metric (percent) above which a frame rewires.
    pub homeostatic_threshold: f64,
    /// Initial value of the informational homeostasis index.
    pub homeostasis_index: f64,
    /// Processing budget for one frame, in milliseconds.
    pub frame_budget_ms: u64,
    /// Seed for the noise source. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            dims: 64,
            channel_weights: [0.05, 0.45, 0.45, 0.05],
            noise_gate: 0.2,
            context_std: 0.1,
            prior_init_std: 0.1,
            learning_rate: 0.05,
            base_plasticity_rate: 0.01,
            homeostatic_threshold: 15.0,
            homeostasis_index: 1.0,
            frame_budget_ms: 200,
            seed: Some(42),
        }
    }
}

impl KernelConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    pub fn frame_budget(&self) -> Duration {
        Duration::from_millis(self.frame_budget_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dims == 0 {
            return Err(Error::config("dims must be > 0"));
        }
        if self.dims > MAX_DIMS {
            return Err(Error::config(format!("dims must be <= {}", MAX_DIMS)));
        }
        if self.channel_weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::config("channel_weights must be finite"));
        }
        if !(0.0..1.0).contains(&self.noise_gate) {
            return Err(Error::config("noise_gate must be in [0, 1)"));
        }
        for (name, value) in [
            ("context_std", self.context_std),
            ("prior_init_std", self.prior_init_std),
            ("learning_rate", self.learning_rate),
            ("base_plasticity_rate", self.base_plasticity_rate),
            ("homeostatic_threshold", self.homeostatic_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::config(format!("{} must be finite and >= 0", name)));
            }
        }
        if !self.homeostasis_index.is_finite() {
            return Err(Error::config("homeostasis_index must be finite"));
        }
        Ok(())
    }
}

/// Gateway bind configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub bind: BindMode,
}

fn default_port() -> u16 {
    18800
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: BindMode::default(),
        }
    }
}

/// Bind mode for the gateway
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    #[default]
    Loopback,
    Lan,
}

impl BindMode {
    pub fn to_addr(&self) -> &str {
        match self {
            BindMode::Loopback => "127.0.0.1",
            BindMode::Lan => "0.0.0.0",
        }
    }
}
