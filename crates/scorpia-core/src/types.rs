//! Core types for the Scorpia kernel

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Number of sensory channels in a raw signal.
pub const CHANNELS: usize = 4;

/// Named sensory channel. The discriminant is the channel's index in a [`RawSignal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Auditory = 0,
    Visual = 1,
    Proprioceptive = 2,
    Social = 3,
}

impl Channel {
    pub const ALL: [Channel; CHANNELS] = [
        Channel::Auditory,
        Channel::Visual,
        Channel::Proprioceptive,
        Channel::Social,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Auditory => "auditory",
            Channel::Visual => "visual",
            Channel::Proprioceptive => "proprioceptive",
            Channel::Social => "social",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One frame of sensory input: exactly one finite value per channel.
///
/// Values are nominally in `[0, 1]` but not clamped; gating and weighting
/// happen in the [`Integrator`](crate::Integrator).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawSignal([f64; CHANNELS]);

impl RawSignal {
    pub fn new(values: [f64; CHANNELS]) -> Result<Self> {
        for channel in Channel::ALL {
            let value = values[channel.index()];
            if !value.is_finite() {
                return Err(Error::InvalidChannel { channel, value });
            }
        }
        Ok(Self(values))
    }

    /// Build from an arbitrary-length slice, rejecting anything but four components.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let array: [f64; CHANNELS] = values.try_into().map_err(|_| Error::InputShape {
            expected: CHANNELS,
            actual: values.len(),
        })?;
        Self::new(array)
    }

    pub fn get(&self, channel: Channel) -> f64 {
        self.0[channel.index()]
    }

    pub fn as_array(&self) -> &[f64; CHANNELS] {
        &self.0
    }
}

/// Per-frame stochastic representation of the integrated load.
///
/// Consumed by the forecaster as input and by the plasticity unit as
/// activation, then dropped. Never carried across frames.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextVector(Vec<f64>);

impl ContextVector {
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Whether a frame only observed or also rewired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameMode {
    Nominal,
    Rewiring,
}

impl FrameMode {
    /// Memoryless homeostatic test. Strictly greater than the threshold rewires.
    pub fn classify(error_metric: f64, threshold: f64) -> Self {
        if error_metric > threshold {
            FrameMode::Rewiring
        } else {
            FrameMode::Nominal
        }
    }

    pub fn is_rewiring(self) -> bool {
        self == FrameMode::Rewiring
    }
}

/// Running state of the kernel, updated once per committed frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KernelState {
    /// Informational; not consumed by the loop.
    pub homeostasis_index: f64,
    pub plasticity_rate: f64,
    /// Absolute forecast error of the last committed frame, in percent.
    pub current_error_metric: f64,
    /// Frames whose processing time exceeded the configured budget.
    pub budget_overruns: u64,
}

impl KernelState {
    pub fn new(homeostasis_index: f64, plasticity_rate: f64) -> Self {
        Self {
            homeostasis_index,
            plasticity_rate,
            current_error_metric: 0.0,
            budget_overruns: 0,
        }
    }
}

/// Post-frame status as reported to external callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KernelStatus {
    pub homeostasis_index: f64,
    pub current_error_metric: f64,
    pub plasticity_active: bool,
    pub frames: u64,
}

/// Read-only copy of the learnable state, for external visualization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub synaptic_weights: Vec<Vec<f64>>,
    pub predictive_priors: Vec<f64>,
}
