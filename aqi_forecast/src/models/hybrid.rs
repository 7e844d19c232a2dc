//! Hybrid forecast: an unweighted average of the statistical and heuristic forecasts

use crate::error::{ForecastError, Result};
use crate::models::{ForecastResult, ModelOutcome};
use tracing::{debug, warn};

/// Name given to combined forecasts
pub const HYBRID_MODEL_NAME: &str = "Hybrid";

/// Combine two optional forecasts.
///
/// - one forecast present: it is returned unchanged;
/// - both present: the heuristic forecast's time axis is canonical and the
///   statistical values are placed on it by position, then averaged point by
///   point. Points where either value is not finite are dropped. Forecasts of
///   different lengths cannot be aligned and yield
///   [`ForecastError::AlignmentError`];
/// - neither present: [`ForecastError::NoForecastAvailable`].
///
/// The combined forecast keeps the statistical model's diagnostics.
pub fn combine(
    statistical: Option<ForecastResult>,
    heuristic: Option<ForecastResult>,
) -> Result<ForecastResult> {
    let (statistical, heuristic) = match (statistical, heuristic) {
        (None, None) => return Err(ForecastError::NoForecastAvailable),
        (Some(only), None) | (None, Some(only)) => {
            debug!(model = only.model(), "single forecast passed through");
            return Ok(only);
        }
        (Some(statistical), Some(heuristic)) => (statistical, heuristic),
    };

    if statistical.horizons() != heuristic.horizons() {
        return Err(ForecastError::AlignmentError(format!(
            "{} forecasts {} steps but {} forecasts {}",
            statistical.model(),
            statistical.horizons(),
            heuristic.model(),
            heuristic.horizons()
        )));
    }

    if statistical.timestamps() != heuristic.timestamps() {
        debug!(
            statistical = statistical.model(),
            heuristic = heuristic.model(),
            "reindexing statistical forecast onto heuristic axis"
        );
    }

    let (timestamps, values): (Vec<_>, Vec<_>) = heuristic
        .points()
        .zip(statistical.values())
        .filter_map(|((timestamp, h), &s)| {
            (h.is_finite() && s.is_finite()).then(|| (timestamp, (h + s) / 2.0))
        })
        .unzip();

    let dropped = heuristic.horizons() - values.len();
    if dropped > 0 {
        warn!(dropped, "dropped hybrid points with undefined inputs");
    }

    let combined = ForecastResult::new(HYBRID_MODEL_NAME, timestamps, values)?;
    Ok(match statistical.diagnostics() {
        Some(diagnostics) => combined.with_diagnostics(*diagnostics),
        None => combined,
    })
}

/// [`combine`] over model outcomes, reporting total failure as unavailable
pub fn combine_outcomes(statistical: &ModelOutcome, heuristic: &ModelOutcome) -> ModelOutcome {
    let result = combine(
        statistical.forecast().cloned(),
        heuristic.forecast().cloned(),
    );
    ModelOutcome::from_result(HYBRID_MODEL_NAME, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn axis(n: usize, offset_days: i64) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| start + Duration::days(offset_days + i as i64))
            .collect()
    }

    fn forecast(name: &str, values: Vec<f64>, offset_days: i64) -> ForecastResult {
        ForecastResult::new(name, axis(values.len(), offset_days), values).unwrap()
    }

    #[test]
    fn test_statistical_axis_is_replaced() {
        let statistical = forecast("ARIMA(5,1,0)", vec![10.0, 20.0], 100);
        let heuristic = forecast("TrendFollowing", vec![30.0, 40.0], 0);

        let combined = combine(Some(statistical), Some(heuristic.clone())).unwrap();
        assert_eq!(combined.timestamps(), heuristic.timestamps());
        assert_eq!(combined.values(), &[20.0, 30.0]);
        assert_eq!(combined.model(), HYBRID_MODEL_NAME);
    }

    #[test]
    fn test_non_finite_points_are_dropped() {
        let statistical = forecast("ARIMA(5,1,0)", vec![10.0, f64::NAN, 30.0], 0);
        let heuristic = forecast("TrendFollowing", vec![20.0, 30.0, f64::INFINITY], 0);

        let combined = combine(Some(statistical), Some(heuristic.clone())).unwrap();
        assert_eq!(combined.values(), &[15.0]);
        assert_eq!(combined.timestamps(), &heuristic.timestamps()[..1]);
    }

    #[test]
    fn test_zero_valued_forecast_is_not_absent() {
        let zeros = forecast("TrendFollowing", vec![0.0; 3], 0);
        let combined = combine(None, Some(zeros.clone())).unwrap();
        assert_eq!(combined, zeros);
    }
}
