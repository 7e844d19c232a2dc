//! # AQI Sentinel
//!
//! Forecasts and anomaly reports for air-quality index readings.
//!
//! The numeric work lives in the workspace crates:
//!
//! - `aqi_math`: rolling means, sample statistics, least squares and simplex
//!   optimization
//! - `aqi_forecast`: the series model, forecasters, hybrid combiner, anomaly
//!   detector and pipeline
//!
//! This crate adds CSV loading and the report printed by the `aqi_report`
//! binary.
//!
//! ## Example
//!
//! ```
//! use aqi_sentinel::{csv_source::read_series, AqiPipeline, AqiReport, PipelineConfig};
//!
//! let csv = "date,aqi\n2024-01-01,80\n2024-01-02,85\n2024-01-03,83\n";
//! let series = read_series(csv.as_bytes(), "inline").unwrap();
//! let pipeline = AqiPipeline::new(PipelineConfig::default()).unwrap();
//!
//! let report = AqiReport::build("inline", &series, &pipeline, 30).unwrap();
//! assert_eq!(report.headline, "Predicted average AQI: data unavailable");
//! assert_eq!(report.recent.len(), 3);
//! ```

pub mod cli;
pub mod csv_source;
pub mod error;
pub mod report;

pub use aqi_forecast;
pub use aqi_math;

// Re-export commonly used types
pub use crate::csv_source::CsvSource;
pub use crate::error::{ReportError, Result};
pub use crate::report::{AqiReport, Reading, DEFAULT_RECENT_READINGS};
pub use aqi_forecast::{
    AnomalyReport, AqiPipeline, ForecastError, ForecastResult, ModelOutcome, PipelineConfig,
    PipelineReport, SeriesSource, TimeSeries,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
