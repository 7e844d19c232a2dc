//! Trailing moving averages
//!
//! A moving average is undefined until a full window has been observed. That
//! state is reported as `None` rather than a sentinel value.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average over a trailing window
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
        })
    }

    /// Push a new observation, evicting the oldest once the window is full
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        if self.values.len() > self.period {
            self.values.pop_front();
        }
    }

    /// Current average, or `None` while fewer than `period` values were seen
    pub fn value(&self) -> Option<f64> {
        if self.values.len() < self.period {
            return None;
        }

        // Offsets from the first value are summed, so a flat window has an
        // exact mean and rounding scales with the spread, not the level.
        let first = *self.values.front()?;
        let offset: f64 = self.values.iter().map(|v| v - first).sum();
        Some(first + offset / self.period as f64)
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the average, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
    }
}

/// Trailing rolling mean aligned with `values`.
///
/// Position `i` holds the mean of `values[i + 1 - period..=i]`, and `None`
/// for the first `period - 1` positions.
pub fn rolling_mean(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut sma = SimpleMovingAverage::new(period)?;

    Ok(values
        .iter()
        .map(|&value| {
            sma.update(value);
            sma.value()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_undefined_until_full() {
        let mut sma = SimpleMovingAverage::new(3).unwrap();
        sma.update(10.0);
        sma.update(11.0);
        assert_eq!(sma.value(), None);

        sma.update(12.0);
        assert_eq!(sma.value(), Some(11.0));

        sma.update(13.0);
        assert_eq!(sma.value(), Some(12.0));
    }

    #[test]
    fn test_sma_reset() {
        let mut sma = SimpleMovingAverage::new(2).unwrap();
        sma.update(1.0);
        sma.update(2.0);
        sma.reset();
        assert_eq!(sma.value(), None);
        assert_eq!(sma.period(), 2);
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(SimpleMovingAverage::new(0).is_err());
        assert!(rolling_mean(&[1.0, 2.0], 0).is_err());
    }

    #[test]
    fn test_rolling_mean_alignment() {
        let data = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        let means = rolling_mean(&data, 3).unwrap();

        assert_eq!(means.len(), data.len());
        assert_eq!(means[0], None);
        assert_eq!(means[1], None);
        assert_eq!(means[2], Some(20.0));
        assert_eq!(means[4], Some(40.0));
    }

    #[test]
    fn test_flat_window_mean_is_exact() {
        for level in [50.3, 0.1, 187.7, 1e-3] {
            let means = rolling_mean(&[level; 10], 7).unwrap();
            assert!(means[6..].iter().all(|m| *m == Some(level)));
        }
    }

    #[test]
    fn test_rolling_mean_shorter_than_period() {
        let means = rolling_mean(&[1.0, 2.0], 7).unwrap();
        assert!(means.iter().all(Option::is_none));
    }
}
