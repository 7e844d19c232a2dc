//! Derivative-free minimization used for likelihood-style model fitting

use serde::{Deserialize, Serialize};

/// Outcome of a Nelder-Mead run
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best point found
    pub optimal_point: Vec<f64>,
    /// Objective value at `optimal_point`
    pub optimal_value: f64,
    /// Number of iterations performed
    pub iterations: usize,
    /// Whether the simplex met the tolerance before `max_iter`
    pub converged: bool,
}

/// Tuning knobs for [`nelder_mead`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations
    pub max_iter: usize,
    /// Relative convergence tolerance on the spread of objective values
    pub tolerance: f64,
    /// Relative convergence tolerance on the simplex diameter
    pub x_tolerance: f64,
    /// Iterations without improvement of the best value before a restart
    pub stall_iterations: usize,
    /// Restarts around the best vertex before a result is accepted
    pub max_restarts: usize,
    /// Reflection coefficient
    pub alpha: f64,
    /// Expansion coefficient
    pub gamma: f64,
    /// Contraction coefficient
    pub rho: f64,
    /// Shrink coefficient
    pub sigma: f64,
    /// Initial simplex step, relative to each non-zero coordinate
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 5000,
            tolerance: 1e-10,
            x_tolerance: 1e-8,
            stall_iterations: 200,
            max_restarts: 3,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

/// Minimize `objective` starting from `initial` with the Nelder-Mead simplex.
///
/// `bounds`, when given, clamps each coordinate to its `(min, max)` pair.
///
/// The simplex is considered settled when the spread of objective values
/// falls below `tolerance * (1 + |best|)`, when its diameter falls below
/// `x_tolerance * (1 + |best point|)`, or when the best value has not improved
/// for `stall_iterations`. A settled simplex is rebuilt around its best vertex
/// (up to `max_restarts` times); the run converges once a restart brings no
/// further improvement. Restarts recover simplices that collapsed onto a bound
/// face or stalled along a flat valley.
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: objective(&[]),
            iterations: 0,
            converged: true,
        };
    }

    let mut simplex = initial_simplex(initial, bounds, config.initial_step);
    let mut values: Vec<f64> = simplex.iter().map(|v| objective(v)).collect();
    let mut iterations = 0;
    let mut converged = false;

    let mut restarts = 0;
    let mut restart_value = f64::INFINITY;
    let mut best_seen = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut since_improvement = 0;

    while iterations < config.max_iter {
        iterations += 1;

        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        let f_scale = config.tolerance * (1.0 + values[best].abs());
        if values[best] < best_seen - f_scale {
            best_seen = values[best];
            since_improvement = 0;
        } else {
            since_improvement += 1;
        }

        let centroid = centroid_without(&simplex, worst);
        let spread = values[worst] - values[best];
        let diameter = simplex
            .iter()
            .map(|v| distance(v, &centroid))
            .fold(0.0, f64::max);
        let x_scale = config.x_tolerance * (1.0 + norm(&simplex[best]));

        let settled = (spread.is_finite() && spread <= f_scale) || diameter <= x_scale;
        let stalled = since_improvement >= config.stall_iterations.max(1);
        if settled || stalled {
            let confirmed = restart_value - values[best] <= f_scale;
            if confirmed || restarts >= config.max_restarts {
                converged = settled || confirmed;
                break;
            }

            restarts += 1;
            restart_value = values[best];
            since_improvement = 0;
            simplex = initial_simplex(&simplex[best], bounds, config.initial_step);
            values = simplex.iter().map(|v| objective(v)).collect();
            continue;
        }

        let reflected = apply_bounds(&lerp(&centroid, &simplex[worst], -config.alpha), bounds);
        let reflected_value = objective(&reflected);

        if reflected_value < values[best] {
            let expanded = apply_bounds(&lerp(&centroid, &reflected, config.gamma), bounds);
            let expanded_value = objective(&expanded);
            if expanded_value < reflected_value {
                simplex[worst] = expanded;
                values[worst] = expanded_value;
            } else {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = reflected_value;
            continue;
        }

        // Contract outside when the reflection beat the worst vertex, inside otherwise.
        let toward = if reflected_value < values[worst] {
            &reflected
        } else {
            &simplex[worst]
        };
        let contracted = apply_bounds(&lerp(&centroid, toward, config.rho), bounds);
        let contracted_value = objective(&contracted);
        if contracted_value < values[worst].min(reflected_value) {
            simplex[worst] = contracted;
            values[worst] = contracted_value;
            continue;
        }

        // Shrink toward the best vertex
        let anchor = simplex[best].clone();
        for i in 0..=n {
            if i != best {
                let shrunk = lerp(&anchor, &simplex[i], config.sigma);
                simplex[i] = apply_bounds(&shrunk, bounds);
                values[i] = objective(&simplex[i]);
            }
        }
    }

    let best = (0..=n)
        .min_by(|&a, &b| values[a].total_cmp(&values[b]))
        .unwrap_or(0);

    NelderMeadResult {
        optimal_point: simplex[best].clone(),
        optimal_value: values[best],
        iterations,
        converged,
    }
}

/// Axis-aligned simplex around `origin`. A step that a bound clamps away is
/// taken in the opposite direction instead.
fn initial_simplex(origin: &[f64], bounds: Option<&[(f64, f64)]>, step: f64) -> Vec<Vec<f64>> {
    let origin = apply_bounds(origin, bounds);
    let mut simplex = Vec::with_capacity(origin.len() + 1);
    simplex.push(origin.clone());

    for i in 0..origin.len() {
        let delta = if origin[i].abs() > 1e-10 {
            step * origin[i].abs()
        } else {
            step
        };
        let mut vertex = origin.clone();
        vertex[i] += delta;
        let mut vertex = apply_bounds(&vertex, bounds);
        if vertex[i] == origin[i] {
            vertex[i] = origin[i] - delta;
            vertex = apply_bounds(&vertex, bounds);
        }
        simplex.push(vertex);
    }

    simplex
}

/// Centroid of all vertices except `exclude`
fn centroid_without(simplex: &[Vec<f64>], exclude: usize) -> Vec<f64> {
    let dims = simplex[0].len();
    let count = (simplex.len() - 1) as f64;
    let mut centroid = vec![0.0; dims];

    for (i, vertex) in simplex.iter().enumerate() {
        if i != exclude {
            for (c, v) in centroid.iter_mut().zip(vertex) {
                *c += v;
            }
        }
    }

    centroid.iter_mut().for_each(|c| *c /= count);
    centroid
}

/// `origin + t * (point - origin)`
fn lerp(origin: &[f64], point: &[f64], t: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(point)
        .map(|(o, p)| o + t * (p - o))
        .collect()
}

fn apply_bounds(point: &[f64], bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    match bounds {
        None => point.to_vec(),
        Some(b) => point
            .iter()
            .enumerate()
            .map(|(i, &x)| match b.get(i) {
                Some(&(lo, hi)) => x.clamp(lo, hi),
                None => x,
            })
            .collect(),
    }
}

fn norm(a: &[f64]) -> f64 {
    a.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_bowl() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
            &[0.0, 0.0],
            None,
            NelderMeadConfig::default(),
        );

        assert!(result.converged);
        assert!((result.optimal_point[0] - 2.0).abs() < 1e-3);
        assert!((result.optimal_point[1] - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_bounds_are_respected() {
        let bounds = [(-1.0, 1.0)];
        let result = nelder_mead(
            |x| (x[0] - 5.0).powi(2),
            &[0.0],
            Some(&bounds),
            NelderMeadConfig::default(),
        );

        assert!(result.optimal_point[0] <= 1.0);
        assert!((result.optimal_point[0] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_iteration_cap_reports_non_convergence() {
        let config = NelderMeadConfig {
            max_iter: 2,
            ..Default::default()
        };
        let result = nelder_mead(
            |x| (x[0] - 100.0).powi(2) + (x[1] + 40.0).powi(2),
            &[0.0, 0.0],
            None,
            config,
        );

        assert!(!result.converged);
        assert_eq!(result.iterations, 2);
    }

    #[test]
    fn test_flat_valley_converges() {
        let rosenbrock = |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let result = nelder_mead(rosenbrock, &[-1.2, 1.0], None, NelderMeadConfig::default());

        assert!(result.converged);
        assert!((result.optimal_point[0] - 1.0).abs() < 1e-3);
        assert!((result.optimal_point[1] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_restart_leaves_bound_face() {
        // The optimum sits on the upper bound of the first coordinate while the
        // second one is still far from its minimum.
        let bounds = [(-0.99, 0.99), (f64::NEG_INFINITY, f64::INFINITY)];
        let result = nelder_mead(
            |x| (x[0] - 3.0).powi(2) + (x[1] - 7.0).powi(2),
            &[0.9, 0.0],
            Some(&bounds),
            NelderMeadConfig::default(),
        );

        assert!(result.converged);
        assert!((result.optimal_point[0] - 0.99).abs() < 1e-6);
        assert!((result.optimal_point[1] - 7.0).abs() < 1e-3);
    }

    #[test]
    fn test_initial_simplex_steps_away_from_bound() {
        let bounds = [(-1.0, 1.0)];
        let simplex = initial_simplex(&[1.0], Some(&bounds), 0.05);
        assert_eq!(simplex, vec![vec![1.0], vec![0.95]]);
    }

    #[test]
    fn test_empty_problem() {
        let result = nelder_mead(|_| 1.5, &[], None, NelderMeadConfig::default());
        assert!(result.converged);
        assert_eq!(result.optimal_value, 1.5);
    }
}
