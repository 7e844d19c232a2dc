//! Differencing and integration for integrated (the "I" in ARIMA) models

/// Apply `d` rounds of first differencing.
///
/// Each round shortens the series by one; differencing stops early once a
/// single value remains.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            break;
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Undo `d` rounds of differencing for values that continue `original`.
///
/// `forecast` is on the `d`-times differenced scale and is assumed to follow
/// directly after the last observation of `original`.
pub fn integrate(forecast: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    let mut result = forecast.to_vec();

    // Innermost level first: level d-1 is the series differenced d-1 times.
    for level in (0..d).rev() {
        let anchor = difference(original, level).last().copied().unwrap_or(0.0);
        let mut running = anchor;
        for value in result.iter_mut() {
            running += *value;
            *value = running;
        }
    }

    result
}
