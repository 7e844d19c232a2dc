//! Report assembly: the pipeline output plus the context a reader needs

use crate::error::Result;
use aqi_forecast::{AqiPipeline, PipelineReport, TimeSeries};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Readings echoed back in the `recent` section by default
pub const DEFAULT_RECENT_READINGS: usize = 30;

/// A single observed reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub aqi: f64,
}

/// Everything the `aqi_report` binary prints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AqiReport {
    /// Where the readings came from
    pub source: String,
    /// Number of readings analyzed
    pub observations: usize,
    /// One-line summary of the forecast
    pub headline: String,
    /// The latest readings, oldest first
    pub recent: Vec<Reading>,
    pub analysis: PipelineReport,
}

/// One-line summary; the mean is rounded to a whole AQI value
pub fn headline(predicted_mean: Option<f64>, horizon: usize) -> String {
    match predicted_mean {
        Some(mean) => format!(
            "Predicted average AQI (next {horizon} steps): {}",
            mean.round() as i64
        ),
        None => "Predicted average AQI: data unavailable".to_string(),
    }
}

impl AqiReport {
    /// Run `pipeline` over `series` and wrap the result
    pub fn build(
        source: impl Into<String>,
        series: &TimeSeries,
        pipeline: &AqiPipeline,
        recent: usize,
    ) -> Result<Self> {
        let analysis = pipeline.run(series)?;
        let headline = headline(analysis.predicted_mean, pipeline.config().horizon);
        info!(%headline, anomalies = analysis.anomalies.len(), "report ready");

        Ok(Self {
            source: source.into(),
            observations: series.len(),
            headline,
            recent: series
                .tail(recent)
                .iter()
                .map(|(timestamp, aqi)| Reading { timestamp, aqi })
                .collect(),
            analysis,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
