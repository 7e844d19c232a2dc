//! Error types for the aqi_forecast crate

use aqi_math::MathError;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while fitting, combining or evaluating forecasts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    /// The statistical model did not converge or its fit was singular
    #[error("Model fit failure: {0}")]
    ModelFitFailure(String),

    /// The series is shorter than a model's minimum
    #[error("Insufficient data for {model}: need at least {needed} observations, got {got}")]
    InsufficientData {
        model: String,
        needed: usize,
        got: usize,
    },

    /// Two forecasts could not be placed on a common time axis
    #[error("Alignment error: {0}")]
    AlignmentError(String),

    /// Neither forecaster produced a forecast
    #[error("No forecast available: every model was unavailable")]
    NoForecastAvailable,

    /// The statistical fit was abandoned after its deadline
    #[error("Model fit timed out after {0:?}")]
    FitTimeout(Duration),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to input series validation
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from numeric kernels
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
