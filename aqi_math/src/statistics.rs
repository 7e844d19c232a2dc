//! Sample statistics over real-valued observations

use statrs::statistics::{Data, OrderStatistics, Statistics};

/// Arithmetic mean, or `None` for an empty sample
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    Some(values.iter().mean())
}

/// Sample standard deviation (n - 1 denominator).
///
/// Returns `None` when fewer than two observations are available, since the
/// estimator is undefined there.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    Some(values.iter().std_dev())
}

/// Median of the sample, or `None` when empty. Even-sized samples average the
/// two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut data = Data::new(values.to_vec());
    Some(data.median())
}
