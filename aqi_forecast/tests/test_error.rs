use aqi_forecast::ForecastError;
use aqi_math::MathError;
use pretty_assertions::assert_eq;
use std::time::Duration;

#[test]
fn test_error_messages() {
    let err = ForecastError::InsufficientData {
        model: "TrendFollowing".to_string(),
        needed: 10,
        got: 4,
    };
    assert_eq!(
        err.to_string(),
        "Insufficient data for TrendFollowing: need at least 10 observations, got 4"
    );

    assert_eq!(
        ForecastError::FitTimeout(Duration::from_millis(250)).to_string(),
        "Model fit timed out after 250ms"
    );
    assert_eq!(
        ForecastError::NoForecastAvailable.to_string(),
        "No forecast available: every model was unavailable"
    );
}

#[test]
fn test_math_errors_convert() {
    let err: ForecastError = MathError::Singular("zero pivot".to_string()).into();
    assert_eq!(err, ForecastError::Math(MathError::Singular("zero pivot".to_string())));
    assert_eq!(err.to_string(), "Math error: Singular system: zero pivot");
}
