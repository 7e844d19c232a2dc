//! # AQI Forecast
//!
//! Short-horizon forecasting and anomaly detection for air-quality index
//! series.
//!
//! ## Features
//!
//! - Validated, immutable time series with cadence inference
//! - ARIMA(p,d,q) fitted by conditional likelihood with AIC/BIC/HQIC diagnostics
//! - A seeded trend-following heuristic
//! - A hybrid forecast averaging both on a common time axis
//! - Rolling-deviation anomaly detection with a global threshold
//! - Explicit "forecast unavailable" outcomes instead of silent gaps
//!
//! ## Quick Start
//!
//! ```rust
//! use aqi_forecast::{AqiPipeline, PipelineConfig, TimeSeries};
//! use chrono::{Duration, TimeZone, Utc};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let readings: Vec<f64> = (0..60)
//!     .map(|i| 120.0 + 25.0 * (i as f64 / 5.0).sin() + (i % 7) as f64)
//!     .collect();
//! let series = TimeSeries::with_cadence(start, Duration::days(1), readings)?;
//!
//! let pipeline = AqiPipeline::new(PipelineConfig::default().with_seed(7))?;
//! let report = pipeline.run(&series)?;
//!
//! if let Some(hybrid) = report.hybrid.forecast() {
//!     assert!(hybrid.horizons() <= 7);
//! }
//! # Ok::<(), aqi_forecast::ForecastError>(())
//! ```

pub mod anomaly;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod runner;

// Re-export commonly used types
pub use crate::anomaly::{AnomalyCaveat, AnomalyDetector, AnomalyRecord, AnomalyReport};
pub use crate::config::PipelineConfig;
pub use crate::data::{SeriesSource, TimeSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{
    FitDiagnostics, ForecastModel, ForecastResult, ModelOutcome, TrainedForecastModel,
};
pub use crate::pipeline::{AqiPipeline, PipelineReport};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
