//! Forecaster - predicts the integrated load from a context vector
//!
//! Holds the prior vector, the only learnable state on the prediction side.
//! Forecast is `sigmoid(priors · context)`; the update is a plain gradient
//! step `priors -= learning_rate * error * context`.

use crate::error::{ensure_finite, Error, Result};
use crate::noise::NoiseSource;
use crate::types::ContextVector;

#[derive(Clone, Debug, PartialEq)]
pub struct Forecaster {
    priors: Vec<f64>,
    learning_rate: f64,
}

impl Forecaster {
    /// Draw the initial priors from N(0, init_std²).
    pub fn new(
        dims: usize,
        init_std: f64,
        learning_rate: f64,
        noise: &mut dyn NoiseSource,
    ) -> Result<Self> {
        let mut priors = vec![0.0; dims];
        noise.fill_normal(0.0, init_std, &mut priors)?;
        ensure_finite("forecaster.init", &priors)?;
        Ok(Self {
            priors,
            learning_rate,
        })
    }

    /// Build from explicit priors.
    pub fn with_priors(priors: Vec<f64>, learning_rate: f64) -> Result<Self> {
        ensure_finite("forecaster.init", &priors)?;
        Ok(Self {
            priors,
            learning_rate,
        })
    }

    /// Forecast in (0, 1).
    pub fn forecast(&self, context: &ContextVector) -> Result<f64> {
        self.check_dims(context)?;
        let activation: f64 = self
            .priors
            .iter()
            .zip(context.as_slice())
            .map(|(p, c)| p * c)
            .sum();
        let forecast = sigmoid(activation);
        if forecast.is_finite() {
            Ok(forecast)
        } else {
            Err(Error::computation("forecast"))
        }
    }

    /// Gradient step against the observed error.
    ///
    /// The new priors are computed aside and only written back when every
    /// component is finite.
    pub fn update(&mut self, error: f64, context: &ContextVector) -> Result<()> {
        self.check_dims(context)?;
        let step = self.learning_rate * error;
        let next: Vec<f64> = self
            .priors
            .iter()
            .zip(context.as_slice())
            .map(|(p, c)| p - step * c)
            .collect();
        ensure_finite("forecaster.update", &next)?;
        self.priors = next;
        Ok(())
    }

    pub fn priors(&self) -> &[f64] {
        &self.priors
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn dims(&self) -> usize {
        self.priors.len()
    }

    fn check_dims(&self, context: &ContextVector) -> Result<()> {
        if context.len() == self.priors.len() {
            Ok(())
        } else {
            Err(Error::dimension_mismatch(self.priors.len(), context.len()))
        }
    }
}

/// Logistic function, split by sign so large |x| never overflows `exp`.
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::SeededNoise;

    fn ctx(values: Vec<f64>) -> ContextVector {
        ContextVector::from_vec(values)
    }

    #[test]
    fn test_zero_priors_forecast_half() {
        let f = Forecaster::with_priors(vec![0.0; 8], 0.05).unwrap();
        assert_eq!(f.forecast(&ctx(vec![0.7; 8])).unwrap(), 0.5);
    }

    #[test]
    fn test_forecast_bounded() {
        let f = Forecaster::with_priors(vec![1.0; 4], 0.05).unwrap();
        let high = f.forecast(&ctx(vec![2.0; 4])).unwrap();
        let low = f.forecast(&ctx(vec![-2.0; 4])).unwrap();
        assert!(high > 0.5 && high < 1.0);
        assert!(low > 0.0 && low < 0.5);
    }

    #[test]
    fn test_update_moves_against_context() {
        let mut f = Forecaster::with_priors(vec![0.0; 4], 0.05).unwrap();
        f.update(0.2, &ctx(vec![1.0, -1.0, 0.5, 0.0])).unwrap();
        let expected = [-0.01, 0.01, -0.005, 0.0];
        for (p, e) in f.priors().iter().zip(expected) {
            assert!((p - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_update_rejects_non_finite_without_mutating() {
        let mut f = Forecaster::with_priors(vec![0.1; 4], 0.05).unwrap();
        let before = f.priors().to_vec();
        let err = f.update(0.2, &ctx(vec![1.0, f64::NAN, 0.0, 0.0])).unwrap_err();
        assert!(matches!(err, Error::Computation { stage: "forecaster.update" }));
        assert_eq!(f.priors(), before.as_slice());
    }

    #[test]
    fn test_dimension_mismatch() {
        let f = Forecaster::with_priors(vec![0.0; 4], 0.05).unwrap();
        assert!(matches!(
            f.forecast(&ctx(vec![0.0; 3])),
            Err(Error::DimensionMismatch { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_seeded_init_is_small() {
        let mut noise = SeededNoise::seeded(42);
        let f = Forecaster::new(64, 0.1, 0.05, &mut noise).unwrap();
        assert_eq!(f.dims(), 64);
        assert!(f.priors().iter().all(|p| p.abs() < 1.0));
    }

    #[test]
    fn test_sigmoid_extremes() {
        assert!(sigmoid(1000.0) <= 1.0);
        assert!(sigmoid(-1000.0) >= 0.0);
        assert!(sigmoid(-1000.0).is_finite());
    }
}
