//! Error types for the Scorpia kernel

use crate::types::Channel;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("input shape error: expected {expected} channels, got {actual}")]
    InputShape { expected: usize, actual: usize },

    #[error("invalid channel value: {channel} = {value}")]
    InvalidChannel { channel: Channel, value: f64 },

    #[error("computation error: non-finite value in {stage}")]
    Computation { stage: &'static str },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn computation(stage: &'static str) -> Self {
        Self::Computation { stage }
    }

    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// True for errors caused by the caller's input rather than by the kernel.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InputShape { .. } | Self::InvalidChannel { .. } | Self::DimensionMismatch { .. }
        )
    }
}

/// Fail with a [`Error::Computation`] unless every value is finite.
pub(crate) fn ensure_finite(stage: &'static str, values: &[f64]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(Error::computation(stage))
    }
}
