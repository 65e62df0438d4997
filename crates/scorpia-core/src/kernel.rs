//! Kernel - the per-frame orchestrator
//!
//! One frame: integrate → derive context → forecast → error → homeostatic
//! branch. A frame either commits completely (state, priors, synapses) or
//! not at all.

use crate::config::KernelConfig;
use crate::error::{ensure_finite, Result};
use crate::forecaster::Forecaster;
use crate::integrator::Integrator;
use crate::noise::{NoiseSource, SeededNoise};
use crate::plasticity::{PlasticityUnit, Renormalization};
use crate::types::{ContextVector, Diagnostic, FrameMode, KernelState, KernelStatus, RawSignal};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Outcome of one committed frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    /// Zero-based index of this frame.
    pub frame: u64,
    pub load: f64,
    pub forecast: f64,
    pub error: f64,
    /// `error * 100`.
    pub error_metric: f64,
    pub mode: FrameMode,
    /// Present on rewiring frames only.
    pub renormalization: Option<Renormalization>,
    pub elapsed: Duration,
}

/// Everything a frame computed, not yet visible to callers.
struct StagedFrame {
    load: f64,
    forecast: f64,
    error: f64,
    error_metric: f64,
    mode: FrameMode,
    /// Staged learners; the committed ones are untouched until `commit`.
    rewired: Option<(Forecaster, PlasticityUnit, Renormalization)>,
}

pub struct Kernel {
    config: KernelConfig,
    integrator: Integrator,
    forecaster: Forecaster,
    plasticity: PlasticityUnit,
    state: KernelState,
    noise: Box<dyn NoiseSource>,
    frames: u64,
}

impl Kernel {
    /// Build a kernel drawing all randomness from `noise`.
    pub fn new(config: KernelConfig, mut noise: Box<dyn NoiseSource>) -> Result<Self> {
        config.validate()?;
        let forecaster = Forecaster::new(
            config.dims,
            config.prior_init_std,
            config.learning_rate,
            noise.as_mut(),
        )?;
        Ok(Self {
            integrator: Integrator::from_config(&config),
            forecaster,
            plasticity: PlasticityUnit::new(config.dims, config.base_plasticity_rate)?,
            state: KernelState::new(config.homeostasis_index, config.base_plasticity_rate),
            noise,
            frames: 0,
            config,
        })
    }

    /// Build a kernel seeded from `config.seed` (or OS entropy when unset).
    pub fn from_config(config: KernelConfig) -> Result<Self> {
        let noise = SeededNoise::from_seed_option(config.seed);
        Self::new(config, Box::new(noise))
    }

    /// Default configuration with an explicit seed.
    pub fn seeded(seed: u64) -> Result<Self> {
        Self::from_config(KernelConfig {
            seed: Some(seed),
            ..Default::default()
        })
    }

    /// Validate a raw vector, run one frame and return the post-frame status.
    pub fn ingest(&mut self, values: &[f64]) -> Result<KernelStatus> {
        let signal = RawSignal::from_slice(values)?;
        self.process_frame(&signal)?;
        Ok(self.status())
    }

    /// Run one frame. On error nothing is committed.
    pub fn process_frame(&mut self, raw: &RawSignal) -> Result<FrameReport> {
        let started = Instant::now();
        let staged = match self.stage_frame(raw) {
            Ok(staged) => staged,
            Err(e) => {
                error!("Frame {} aborted: {}", self.frames, e);
                return Err(e);
            }
        };
        Ok(self.commit(staged, started))
    }

    fn stage_frame(&mut self, raw: &RawSignal) -> Result<StagedFrame> {
        let load = self.integrator.integrate(raw);
        ensure_finite("integrate", &[load])?;

        let context = self.derive_context(load)?;
        let forecast = self.forecaster.forecast(&context)?;

        // The integrated load is the frame's own ground truth.
        let error = (forecast - load).abs();
        let error_metric = error * 100.0;
        ensure_finite("error", &[error_metric])?;

        let mode = FrameMode::classify(error_metric, self.config.homeostatic_threshold);
        let rewired = match mode {
            FrameMode::Rewiring => {
                warn!("Error metric critical ({:.2}%), rewiring active", error_metric);
                let mut forecaster = self.forecaster.clone();
                let mut plasticity = self.plasticity.clone();
                forecaster.update(error, &context)?;
                let renormalization = plasticity.adapt(context.as_slice(), error)?;
                Some((forecaster, plasticity, renormalization))
            }
            FrameMode::Nominal => {
                info!("System nominal, error metric {:.2}%", error_metric);
                None
            }
        };

        Ok(StagedFrame {
            load,
            forecast,
            error,
            error_metric,
            mode,
            rewired,
        })
    }

    fn derive_context(&mut self, load: f64) -> Result<ContextVector> {
        let mut values = vec![0.0; self.config.dims];
        self.noise
            .fill_normal(load, self.config.context_std, &mut values)?;
        ensure_finite("context", &values)?;
        Ok(ContextVector::from_vec(values))
    }

    fn commit(&mut self, staged: StagedFrame, started: Instant) -> FrameReport {
        let renormalization = staged
            .rewired
            .map(|(forecaster, plasticity, renormalization)| {
                self.forecaster = forecaster;
                self.plasticity = plasticity;
                renormalization
            });
        self.state.current_error_metric = staged.error_metric;
        let frame = self.frames;
        self.frames += 1;

        let elapsed = started.elapsed();
        if elapsed > self.config.frame_budget() {
            self.state.budget_overruns += 1;
            warn!(
                "Frame {} took {:?}, over the {:?} budget",
                frame,
                elapsed,
                self.config.frame_budget()
            );
        }
        debug!(
            "Frame {}: load={:.4} forecast={:.4} mode={:?}",
            frame, staged.load, staged.forecast, staged.mode
        );

        FrameReport {
            frame,
            load: staged.load,
            forecast: staged.forecast,
            error: staged.error,
            error_metric: staged.error_metric,
            mode: staged.mode,
            renormalization,
            elapsed,
        }
    }

    pub fn state(&self) -> &KernelState {
        &self.state
    }

    pub fn status(&self) -> KernelStatus {
        KernelStatus {
            homeostasis_index: self.state.homeostasis_index,
            current_error_metric: self.state.current_error_metric,
            plasticity_active: self.plasticity_active(),
            frames: self.frames,
        }
    }

    /// Whether the current error metric is over the homeostatic threshold.
    pub fn plasticity_active(&self) -> bool {
        FrameMode::classify(
            self.state.current_error_metric,
            self.config.homeostatic_threshold,
        )
        .is_rewiring()
    }

    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic {
            synaptic_weights: self.plasticity.synapses().to_rows(),
            predictive_priors: self.forecaster.priors().to_vec(),
        }
    }

    /// Number of committed frames.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    pub fn forecaster(&self) -> &Forecaster {
        &self.forecaster
    }

    pub fn plasticity(&self) -> &PlasticityUnit {
        &self.plasticity
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("frames", &self.frames)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
