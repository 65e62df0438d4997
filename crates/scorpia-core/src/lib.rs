//! Scorpia Core - closed-loop predictive kernel
//!
//! Each frame a four-channel sensory signal is integrated into a bounded
//! load, expanded into a noisy context vector, and forecast from a learned
//! prior vector. When the forecast misses by more than the homeostatic
//! threshold, the priors take a gradient step and the synapse matrix takes
//! a Hebbian step, together or not at all.
//!
//! - [`Integrator`]: gated, weighted, tanh-saturated channel sum
//! - [`Forecaster`]: sigmoid forecast over the prior vector
//! - [`PlasticityUnit`]: error-modulated Hebbian update with global renormalization
//! - [`Kernel`]: the frame orchestrator and running [`KernelState`]

pub mod config;
pub mod error;
pub mod forecaster;
pub mod integrator;
pub mod kernel;
pub mod noise;
pub mod plasticity;
pub mod trace;
pub mod types;

pub use config::{BindMode, GatewayConfig, KernelConfig};
pub use error::{Error, Result};
pub use forecaster::Forecaster;
pub use integrator::Integrator;
pub use kernel::{FrameReport, Kernel};
pub use noise::{NoiseSource, SeededNoise};
pub use plasticity::{PlasticityUnit, Renormalization, SynapseMatrix};
pub use trace::Trace;
pub use types::*;
