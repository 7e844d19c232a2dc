//! Trend-following heuristic forecaster
//!
//! Projects the trailing slope of the series forward and perturbs each step
//! with Gaussian noise. It has no learned parameters and makes no accuracy
//! claim; it only provides a second, independent opinion for the hybrid
//! forecast. All randomness comes from a caller-owned source, so a fixed seed
//! and a fixed input always give the same forecast.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::debug;

/// Readings spanned by the slope estimate
pub const DEFAULT_LOOKBACK: usize = 10;
/// Standard deviation of the per-step noise
pub const DEFAULT_NOISE_STD_DEV: f64 = 5.0;

/// Trend-following model
#[derive(Debug, Clone)]
pub struct TrendFollowingModel {
    /// Name of the model
    name: String,
    /// Number of trailing readings the slope is taken over
    lookback: usize,
    /// Per-step noise distribution
    noise: Normal<f64>,
    /// Seed for the noise; `None` draws a fresh seed from the OS per forecast
    seed: Option<u64>,
}

/// Trained trend-following model
#[derive(Debug, Clone)]
pub struct TrainedTrendModel {
    /// Name of the model
    name: String,
    /// Estimated change per step
    slope: f64,
    /// Last observed value
    last_value: f64,
    /// Training series, for the forecast time axis
    history: TimeSeries,
    /// Per-step noise distribution
    noise: Normal<f64>,
    /// Seed for the noise
    seed: Option<u64>,
}

impl TrendFollowingModel {
    /// Create a new trend-following model with the given noise level
    pub fn new(noise_std_dev: f64) -> Result<Self> {
        if !noise_std_dev.is_finite() || noise_std_dev < 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Noise standard deviation must be finite and non-negative, got {noise_std_dev}"
            )));
        }
        let noise = Normal::new(0.0, noise_std_dev)
            .map_err(|err| ForecastError::InvalidParameter(err.to_string()))?;

        Ok(Self {
            name: "TrendFollowing".to_string(),
            lookback: DEFAULT_LOOKBACK,
            noise,
            seed: None,
        })
    }

    /// Use a different slope lookback
    pub fn with_lookback(mut self, lookback: usize) -> Result<Self> {
        if lookback < 2 {
            return Err(ForecastError::InvalidParameter(
                "Lookback must span at least 2 readings".to_string(),
            ));
        }
        self.lookback = lookback;
        Ok(self)
    }

    /// Fix the noise seed for reproducible forecasts
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }
}

impl ForecastModel for TrendFollowingModel {
    type Trained = TrainedTrendModel;

    fn train(&self, data: &TimeSeries) -> Result<TrainedTrendModel> {
        let values = data.values();
        let n = values.len();
        if n < self.lookback {
            return Err(ForecastError::InsufficientData {
                model: self.name.clone(),
                needed: self.lookback,
                got: n,
            });
        }

        // The anchor is the `lookback`-th reading from the end.
        let last_value = values[n - 1];
        let slope = (last_value - values[n - self.lookback]) / self.lookback as f64;
        debug!(slope, last_value, "trend estimated");

        Ok(TrainedTrendModel {
            name: self.name.clone(),
            slope,
            last_value,
            history: data.clone(),
            noise: self.noise,
            seed: self.seed,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedTrendModel {
    /// Estimated change per step
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Forecast drawing noise from a caller-supplied random source
    pub fn forecast_with_rng<R: Rng + ?Sized>(
        &self,
        horizon: usize,
        rng: &mut R,
    ) -> Result<ForecastResult> {
        let timestamps = self.history.future_timestamps(horizon)?;
        let mut values = Vec::with_capacity(horizon);
        for step in 1..=horizon {
            let noise = self.noise.sample(rng);
            values.push(self.last_value + self.slope * step as f64 + noise);
        }

        ForecastResult::new(self.name.clone(), timestamps, values)
    }
}

impl TrainedForecastModel for TrainedTrendModel {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.forecast_with_rng(horizon, &mut rng)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
