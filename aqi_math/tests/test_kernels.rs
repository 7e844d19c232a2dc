use aqi_math::differencing::{difference, integrate};
use aqi_math::linalg::least_squares;
use aqi_math::moving_averages::rolling_mean;
use aqi_math::optimization::{nelder_mead, NelderMeadConfig};
use aqi_math::statistics::{mean, median, sample_std_dev};
use aqi_math::MathError;
use approx::assert_relative_eq;
use rstest::rstest;

#[rstest]
#[case(1)]
#[case(2)]
fn test_integrate_inverts_difference(#[case] d: usize) {
    let series = [120.0, 131.0, 127.0, 140.0, 152.0, 149.0, 158.0];
    let (history, future) = series.split_at(4);

    let diffed_full = difference(&series, d);
    let future_diffs = &diffed_full[diffed_full.len() - future.len()..];
    let restored = integrate(future_diffs, history, d);

    for (got, want) in restored.iter().zip(future) {
        assert_relative_eq!(*got, *want, epsilon = 1e-9);
    }
}

#[test]
fn test_rolling_mean_feeds_sample_statistics() {
    let values = [3.0, 5.0, 7.0, 9.0, 11.0, 30.0];
    let means = rolling_mean(&values, 3).unwrap();
    let deviations: Vec<f64> = values
        .iter()
        .zip(&means)
        .filter_map(|(v, m)| m.map(|m| v - m))
        .collect();

    assert_eq!(deviations.len(), 4);
    assert_relative_eq!(deviations[0], 2.0);
    assert_relative_eq!(deviations[3], 30.0 - 50.0 / 3.0, epsilon = 1e-12);
    assert!(sample_std_dev(&deviations).unwrap() > 0.0);
}

#[rstest]
#[case(&[], None)]
#[case(&[4.0], Some(4.0))]
#[case(&[9.0, 1.0, 5.0], Some(5.0))]
#[case(&[4.0, 1.0, 3.0, 2.0], Some(2.5))]
fn test_median(#[case] values: &[f64], #[case] expected: Option<f64>) {
    assert_eq!(median(values), expected);
}

#[test]
fn test_mean_and_spread() {
    let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    assert_relative_eq!(mean(&values).unwrap(), 5.0);
    assert_relative_eq!(
        sample_std_dev(&values).unwrap(),
        (32.0_f64 / 7.0).sqrt(),
        epsilon = 1e-12
    );
}

#[test]
fn test_least_squares_then_simplex_agree() {
    // y = 1.5 x1 - 0.5 x2 exactly
    let rows: Vec<Vec<f64>> = (0..12)
        .map(|i| vec![i as f64, ((i * 7) % 5) as f64])
        .collect();
    let target: Vec<f64> = rows.iter().map(|r| 1.5 * r[0] - 0.5 * r[1]).collect();

    let beta = least_squares(&rows, &target).unwrap();
    assert_relative_eq!(beta[0], 1.5, epsilon = 1e-9);
    assert_relative_eq!(beta[1], -0.5, epsilon = 1e-9);

    let sse = |b: &[f64]| -> f64 {
        rows.iter()
            .zip(&target)
            .map(|(r, y)| (y - b[0] * r[0] - b[1] * r[1]).powi(2))
            .sum()
    };
    let result = nelder_mead(sse, &[0.0, 0.0], None, NelderMeadConfig::default());
    assert!(result.converged);
    assert_relative_eq!(result.optimal_point[0], 1.5, epsilon = 1e-3);
    assert_relative_eq!(result.optimal_point[1], -0.5, epsilon = 1e-3);
}

#[test]
fn test_collinear_design_is_singular() {
    let rows: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64, 2.0 * i as f64]).collect();
    let target = vec![1.0; 6];
    assert!(matches!(
        least_squares(&rows, &target),
        Err(MathError::Singular(_))
    ));
}
