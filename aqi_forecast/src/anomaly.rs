//! Rolling-deviation anomaly detection
//!
//! Each reading is compared against the mean of the trailing window ending
//! at it. The spread of those deviations over the whole series gives a single
//! global cutoff; readings whose absolute deviation exceeds
//! `threshold × spread` are flagged.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use aqi_math::moving_averages::rolling_mean;
use aqi_math::statistics::sample_std_dev;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Default trailing window length
pub const DEFAULT_WINDOW: usize = 7;
/// Default multiplier applied to the deviation spread
pub const DEFAULT_THRESHOLD: f64 = 1.5;

/// Rounding allowance, in units of machine epsilon relative to the largest
/// reading. Spreads and deviations below it are treated as zero.
const ROUNDING_ULPS: f64 = 64.0;

/// One flagged reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalyRecord {
    pub timestamp: DateTime<Utc>,
    /// Observed value
    pub value: f64,
    /// Mean of the trailing window ending at this reading
    pub rolling_mean: f64,
    /// `value - rolling_mean`
    pub deviation: f64,
    /// Absolute cutoff the deviation was compared against
    pub threshold: f64,
}

/// Per-reading baseline; `None` until a full window has been seen
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaselinePoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub rolling_mean: Option<f64>,
    pub deviation: Option<f64>,
}

/// Non-fatal conditions the consumer should be told about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyCaveat {
    /// Every deviation is identical, so the spread is zero and any nonzero
    /// deviation is flagged
    DegenerateVariance,
}

/// Result of one detection pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    /// Flagged readings in chronological order
    pub records: Vec<AnomalyRecord>,
    /// Sample standard deviation of all defined deviations; `None` when fewer
    /// than two deviations exist. Spreads within rounding noise read as zero.
    pub deviation_std_dev: Option<f64>,
    /// Absolute cutoff, `threshold × deviation_std_dev`, or the rounding
    /// noise floor when the spread is degenerate
    pub cutoff: Option<f64>,
    /// Window length used
    pub window: usize,
    /// Multiplier used
    pub threshold: f64,
    pub caveats: Vec<AnomalyCaveat>,
}

impl AnomalyReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn has_caveat(&self, caveat: AnomalyCaveat) -> bool {
        self.caveats.contains(&caveat)
    }
}

/// Rolling-deviation anomaly detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyDetector {
    window: usize,
    threshold: f64,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl AnomalyDetector {
    /// Create a detector with the given window length and threshold multiplier
    pub fn new(window: usize, threshold: f64) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Anomaly window must be positive".to_string(),
            ));
        }
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Anomaly threshold must be a positive number, got {threshold}"
            )));
        }

        Ok(Self { window, threshold })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Rolling mean and deviation for every reading
    pub fn baseline(&self, series: &TimeSeries) -> Result<Vec<BaselinePoint>> {
        let means = rolling_mean(series.values(), self.window)?;

        Ok(series
            .iter()
            .zip(means)
            .map(|((timestamp, value), rolling_mean)| BaselinePoint {
                timestamp,
                value,
                rolling_mean,
                deviation: rolling_mean.map(|mean| value - mean),
            })
            .collect())
    }

    /// Flag readings that stray too far from their rolling baseline.
    ///
    /// A series too short to define two deviations yields an empty report.
    #[instrument(skip(self, series), fields(n = series.len(), window = self.window))]
    pub fn detect(&self, series: &TimeSeries) -> Result<AnomalyReport> {
        let baseline = self.baseline(series)?;
        let deviations: Vec<f64> = baseline.iter().filter_map(|p| p.deviation).collect();

        let mut report = AnomalyReport {
            records: Vec::new(),
            deviation_std_dev: None,
            cutoff: None,
            window: self.window,
            threshold: self.threshold,
            caveats: Vec::new(),
        };

        let Some(spread) = sample_std_dev(&deviations) else {
            debug!(defined = deviations.len(), "too few deviations to score");
            return Ok(report);
        };

        let scale = series.values().iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let noise_floor = ROUNDING_ULPS * f64::EPSILON * scale;

        let (spread, cutoff) = if spread <= noise_floor {
            warn!(spread, noise_floor, "deviation spread is within rounding of zero");
            report.caveats.push(AnomalyCaveat::DegenerateVariance);
            (0.0, noise_floor)
        } else {
            (spread, self.threshold * spread)
        };

        report.deviation_std_dev = Some(spread);
        report.cutoff = Some(cutoff);
        report.records = baseline
            .iter()
            .filter_map(|point| {
                let (rolling_mean, deviation) = (point.rolling_mean?, point.deviation?);
                (deviation.abs() > cutoff).then_some(AnomalyRecord {
                    timestamp: point.timestamp,
                    value: point.value,
                    rolling_mean,
                    deviation,
                    threshold: cutoff,
                })
            })
            .collect();

        debug!(flagged = report.records.len(), cutoff, "anomaly scan finished");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn series(values: Vec<f64>) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        TimeSeries::with_cadence(start, Duration::days(1), values).unwrap()
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(AnomalyDetector::new(0, 1.5).is_err());
        assert!(AnomalyDetector::new(7, 0.0).is_err());
        assert!(AnomalyDetector::new(7, -1.0).is_err());
        assert!(AnomalyDetector::new(7, f64::NAN).is_err());
    }

    #[test]
    fn test_defaults() {
        let detector = AnomalyDetector::default();
        assert_eq!(detector.window(), 7);
        assert_eq!(detector.threshold(), 1.5);
    }

    #[test]
    fn test_baseline_marks_warmup_as_undefined() {
        let detector = AnomalyDetector::new(3, 1.5).unwrap();
        let baseline = detector
            .baseline(&series(vec![1.0, 2.0, 3.0, 4.0]))
            .unwrap();

        assert_eq!(baseline[0].rolling_mean, None);
        assert_eq!(baseline[1].deviation, None);
        assert_eq!(baseline[2].rolling_mean, Some(2.0));
        assert_eq!(baseline[3].deviation, Some(1.0));
    }

    #[test]
    fn test_single_defined_deviation_is_not_scored() {
        let detector = AnomalyDetector::new(3, 1.5).unwrap();
        let report = detector.detect(&series(vec![1.0, 2.0, 30.0])).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.deviation_std_dev, None);
    }
}
