//! Error types for report generation

use aqi_forecast::ForecastError;
use thiserror::Error;

/// Errors raised while loading readings or producing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A date cell that matches none of the accepted formats
    #[error("Unparseable date '{value}' on line {line}")]
    Date { line: u64, value: String },

    /// The file parsed but held no readings
    #[error("No readings found in {0}")]
    Empty(String),

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

pub type Result<T> = std::result::Result<T, ReportError>;
