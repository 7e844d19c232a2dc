//! Forecasting models for air-quality series

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::{info, warn};

pub mod arima;
pub mod hybrid;
pub mod trend;

pub use arima::ArimaOrder;

/// Forecast result containing predicted values on a time axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Name of the model that produced the forecast
    model: String,
    /// Timestamps of the forecasted points
    timestamps: Vec<DateTime<Utc>>,
    /// Forecasted values
    values: Vec<f64>,
    /// Fit diagnostics, present for statistical models
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostics: Option<FitDiagnostics>,
}

/// Goodness-of-fit summary of a statistical model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitDiagnostics {
    /// Akaike information criterion
    pub aic: f64,
    /// Bayesian information criterion
    pub bic: f64,
    /// Hannan-Quinn information criterion
    pub hqic: f64,
    /// Conditional Gaussian log-likelihood
    pub log_likelihood: f64,
    /// Innovation variance estimate
    pub sigma2: f64,
    /// Order the model was fitted with
    pub order: ArimaOrder,
    /// Observations that entered the likelihood
    pub n_obs: usize,
    /// Optimizer iterations used
    pub iterations: usize,
}

impl FitDiagnostics {
    /// Flatten into a `name -> value` map for tabular display
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("aic".to_string(), self.aic),
            ("bic".to_string(), self.bic),
            ("hqic".to_string(), self.hqic),
            ("log_likelihood".to_string(), self.log_likelihood),
            ("sigma2".to_string(), self.sigma2),
            ("order_p".to_string(), self.order.p as f64),
            ("order_d".to_string(), self.order.d as f64),
            ("order_q".to_string(), self.order.q as f64),
        ])
    }
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(
        model: impl Into<String>,
        timestamps: Vec<DateTime<Utc>>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if values.len() != timestamps.len() {
            return Err(ForecastError::DataError(format!(
                "Values length ({}) doesn't match timestamps length ({})",
                values.len(),
                timestamps.len()
            )));
        }

        Ok(Self {
            model: model.into(),
            timestamps,
            values,
            diagnostics: None,
        })
    }

    /// Attach fit diagnostics
    pub fn with_diagnostics(mut self, diagnostics: FitDiagnostics) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Name of the producing model
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the timestamps
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Iterate over `(timestamp, value)` pairs
    pub fn points(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.values.len()
    }

    /// Fit diagnostics, if the producing model reports any
    pub fn diagnostics(&self) -> Option<&FitDiagnostics> {
        self.diagnostics.as_ref()
    }

    /// Average forecast value over the horizon, `None` for an empty forecast
    pub fn mean(&self) -> Option<f64> {
        aqi_math::statistics::mean(&self.values)
    }

    /// Calculate mean absolute error between forecast and actual values
    pub fn mean_absolute_error(&self, actual: &[f64]) -> Result<f64> {
        self.check_actual_len(actual)?;

        let sum: f64 = self
            .values
            .iter()
            .zip(actual)
            .map(|(f, a)| (f - a).abs())
            .sum();

        Ok(sum / self.values.len() as f64)
    }

    /// Calculate mean squared error between forecast and actual values
    pub fn mean_squared_error(&self, actual: &[f64]) -> Result<f64> {
        self.check_actual_len(actual)?;

        let sum: f64 = self
            .values
            .iter()
            .zip(actual)
            .map(|(f, a)| (f - a).powi(2))
            .sum();

        Ok(sum / self.values.len() as f64)
    }

    fn check_actual_len(&self, actual: &[f64]) -> Result<()> {
        if self.values.is_empty() || self.values.len() != actual.len() {
            return Err(ForecastError::DataError(format!(
                "Forecast length ({}) doesn't match actual length ({})",
                self.values.len(),
                actual.len()
            )));
        }
        Ok(())
    }
}

/// Either a usable forecast or the reason a model could not produce one.
///
/// Keeps "no forecast" distinguishable from a forecast whose values are zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelOutcome {
    /// The model produced a forecast
    Available(ForecastResult),
    /// The model failed; the pipeline carries on without it
    Unavailable {
        model: String,
        #[serde(serialize_with = "serialize_reason")]
        reason: ForecastError,
    },
}

fn serialize_reason<S: Serializer>(
    reason: &ForecastError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(reason)
}

impl ModelOutcome {
    /// Wrap a model result, logging the failure when there is one
    pub fn from_result(model: impl Into<String>, result: Result<ForecastResult>) -> Self {
        let model = model.into();
        match result {
            Ok(forecast) => {
                info!(model = %model, horizon = forecast.horizons(), "forecast available");
                ModelOutcome::Available(forecast)
            }
            Err(reason) => {
                warn!(model = %model, %reason, "forecast unavailable");
                ModelOutcome::Unavailable { model, reason }
            }
        }
    }

    /// The forecast, if the model produced one
    pub fn forecast(&self) -> Option<&ForecastResult> {
        match self {
            ModelOutcome::Available(forecast) => Some(forecast),
            ModelOutcome::Unavailable { .. } => None,
        }
    }

    /// Consume the outcome, keeping only an available forecast
    pub fn into_forecast(self) -> Option<ForecastResult> {
        match self {
            ModelOutcome::Available(forecast) => Some(forecast),
            ModelOutcome::Unavailable { .. } => None,
        }
    }

    /// Why the model is unavailable, if it is
    pub fn reason(&self) -> Option<&ForecastError> {
        match self {
            ModelOutcome::Available(_) => None,
            ModelOutcome::Unavailable { reason, .. } => Some(reason),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ModelOutcome::Available(_))
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate forecast for future periods
    fn forecast(&self, horizon: usize) -> Result<ForecastResult>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on time series data
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on time series data
    fn train(&self, data: &TimeSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;

    /// Train and forecast in one step, converting any failure into
    /// [`ModelOutcome::Unavailable`]
    fn outcome(&self, data: &TimeSeries, horizon: usize) -> ModelOutcome {
        let result = self
            .train(data)
            .and_then(|trained| trained.forecast(horizon));
        ModelOutcome::from_result(self.name(), result)
    }
}
