//! Time series data handling for forecasting

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Utc};

/// Sampling step assumed when a series is too short to infer one
pub const DEFAULT_CADENCE_DAYS: i64 = 1;

/// Ordered, immutable sequence of `(timestamp, value)` readings.
///
/// Timestamps are strictly increasing and values are finite; both are checked
/// on construction, so every consumer can rely on them.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

/// Anything that can hand the pipeline a series to analyze
pub trait SeriesSource {
    /// Produce the series for one analysis run
    fn fetch(&self) -> Result<TimeSeries>;
}

impl SeriesSource for TimeSeries {
    fn fetch(&self) -> Result<TimeSeries> {
        Ok(self.clone())
    }
}

impl TimeSeries {
    /// Create a series from parallel timestamp and value vectors
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Timestamps length ({}) doesn't match values length ({})",
                timestamps.len(),
                values.len()
            )));
        }

        if let Some(i) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ForecastError::DataError(format!(
                "Timestamps must be strictly increasing: {} is not after {}",
                timestamps[i + 1],
                timestamps[i]
            )));
        }

        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Value at position {i} is not finite"
            )));
        }

        Ok(Self { timestamps, values })
    }

    /// Create a series from `(timestamp, value)` pairs
    pub fn from_points(points: Vec<(DateTime<Utc>, f64)>) -> Result<Self> {
        let (timestamps, values) = points.into_iter().unzip();
        Self::new(timestamps, values)
    }

    /// Create an evenly spaced series starting at `start`
    pub fn with_cadence(start: DateTime<Utc>, step: Duration, values: Vec<f64>) -> Result<Self> {
        if step <= Duration::zero() {
            return Err(ForecastError::InvalidParameter(
                "Cadence must be a positive duration".to_string(),
            ));
        }

        let timestamps = (0..values.len())
            .map(|i| offset(start, step, i))
            .collect::<Result<Vec<_>>>()?;
        Self::new(timestamps, values)
    }

    /// Get the readings
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the timestamps
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Iterate over `(timestamp, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }

    /// Check if the time series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the length of the time series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Most recent reading
    pub fn last(&self) -> Option<(DateTime<Utc>, f64)> {
        Some((*self.timestamps.last()?, *self.values.last()?))
    }

    /// Get a slice of the data from start to end index
    pub fn slice(&self, start: usize, end: Option<usize>) -> Result<Self> {
        let end = end.unwrap_or(self.len());
        if start > end || end > self.len() {
            return Err(ForecastError::DataError(format!(
                "Slice {start}..{end} out of range for series of length {}",
                self.len()
            )));
        }

        Ok(Self {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
        })
    }

    /// The most recent `n` readings (all of them when the series is shorter)
    pub fn tail(&self, n: usize) -> Self {
        let start = self.len().saturating_sub(n);
        Self {
            timestamps: self.timestamps[start..].to_vec(),
            values: self.values[start..].to_vec(),
        }
    }

    /// Inferred sampling step: the median gap between consecutive readings.
    ///
    /// Irregular sampling times (readings taken at a different hour each day,
    /// say) still resolve to the dominant step.
    pub fn cadence(&self) -> Duration {
        let gaps: Vec<f64> = self
            .timestamps
            .windows(2)
            .map(|w| (w[1] - w[0]).num_milliseconds() as f64)
            .collect();

        match aqi_math::statistics::median(&gaps) {
            Some(ms) if ms >= 1.0 => Duration::milliseconds(ms.round() as i64),
            _ => Duration::days(DEFAULT_CADENCE_DAYS),
        }
    }

    /// Timestamps for `horizon` future steps continuing the inferred cadence
    pub fn future_timestamps(&self, horizon: usize) -> Result<Vec<DateTime<Utc>>> {
        let (last, _) = self.last().ok_or_else(|| {
            ForecastError::DataError("Cannot extend an empty time series".to_string())
        })?;
        let step = self.cadence();

        (1..=horizon).map(|i| offset(last, step, i)).collect()
    }
}

/// `origin + steps × step`, or a `DataError` when it leaves chrono's range
fn offset(origin: DateTime<Utc>, step: Duration, steps: usize) -> Result<DateTime<Utc>> {
    i32::try_from(steps)
        .ok()
        .and_then(|k| step.checked_mul(k))
        .and_then(|delta| origin.checked_add_signed(delta))
        .ok_or_else(|| {
            ForecastError::DataError(format!(
                "Timestamp {steps} steps of {step} after {origin} is out of range"
            ))
        })
}
