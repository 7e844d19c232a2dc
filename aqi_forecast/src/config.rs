//! Pipeline configuration
//!
//! Every tunable is an explicit field; nothing is read from globals or the
//! environment. Missing fields in a JSON document fall back to the defaults.

use crate::anomaly::{AnomalyDetector, DEFAULT_THRESHOLD, DEFAULT_WINDOW};
use crate::error::{ForecastError, Result};
use crate::models::arima::{ArimaModel, ArimaOrder};
use crate::models::trend::{TrendFollowingModel, DEFAULT_LOOKBACK, DEFAULT_NOISE_STD_DEV};
use aqi_math::optimization::NelderMeadConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of forecast steps
pub const DEFAULT_HORIZON: usize = 7;
/// Default deadline for the statistical fit
pub const DEFAULT_FIT_TIMEOUT_MS: u64 = 5_000;

/// Settings for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of future steps to forecast
    pub horizon: usize,
    /// ARIMA order
    pub order: ArimaOrder,
    /// Simplex settings for the ARIMA fit
    pub optimizer: NelderMeadConfig,
    /// Deadline for the ARIMA fit, in milliseconds
    pub fit_timeout_ms: u64,
    /// Readings spanned by the heuristic slope
    pub trend_lookback: usize,
    /// Standard deviation of the heuristic noise
    pub noise_std_dev: f64,
    /// Seed for the heuristic noise; `None` seeds from the OS
    pub seed: Option<u64>,
    /// Rolling window for anomaly detection
    pub anomaly_window: usize,
    /// Deviation multiplier for anomaly detection
    pub anomaly_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            order: ArimaOrder::default(),
            optimizer: NelderMeadConfig::default(),
            fit_timeout_ms: DEFAULT_FIT_TIMEOUT_MS,
            trend_lookback: DEFAULT_LOOKBACK,
            noise_std_dev: DEFAULT_NOISE_STD_DEV,
            seed: None,
            anomaly_window: DEFAULT_WINDOW,
            anomaly_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| ForecastError::InvalidParameter(format!("Invalid config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Fix the heuristic noise seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Change the forecast horizon
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn fit_timeout(&self) -> Duration {
        Duration::from_millis(self.fit_timeout_ms)
    }

    /// Check every field, building each component once to reuse its checks
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Horizon must be at least 1".to_string(),
            ));
        }
        if self.fit_timeout_ms == 0 {
            return Err(ForecastError::InvalidParameter(
                "Fit timeout must be positive".to_string(),
            ));
        }
        let optimizer = &self.optimizer;
        if optimizer.max_iter == 0
            || !(optimizer.tolerance > 0.0)
            || !(optimizer.x_tolerance >= 0.0)
        {
            return Err(ForecastError::InvalidParameter(
                "Optimizer needs a positive iteration budget and tolerance".to_string(),
            ));
        }

        self.trend_model()?;
        self.anomaly_detector()?;
        Ok(())
    }

    /// The statistical model described by this config
    pub fn arima_model(&self) -> ArimaModel {
        ArimaModel::with_order(self.order).with_optimizer(self.optimizer)
    }

    /// The heuristic model described by this config
    pub fn trend_model(&self) -> Result<TrendFollowingModel> {
        let model =
            TrendFollowingModel::new(self.noise_std_dev)?.with_lookback(self.trend_lookback)?;
        Ok(match self.seed {
            Some(seed) => model.with_seed(seed),
            None => model,
        })
    }

    /// The anomaly detector described by this config
    pub fn anomaly_detector(&self) -> Result<AnomalyDetector> {
        AnomalyDetector::new(self.anomaly_window, self.anomaly_threshold)
    }
}
