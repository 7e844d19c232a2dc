//! Dense least-squares helpers for small regression problems

use crate::{MathError, Result};

/// Pivots smaller than this fraction of their diagonal entry are treated as zero.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Solve `A x = b` for symmetric positive definite `A` via Cholesky.
///
/// A rank-deficient `A` (for example the normal equations of a constant
/// regressor set) is reported as [`MathError::Singular`] instead of being
/// regularized away.
pub fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(format!(
            "Expected a {n}x{n} system, got {} rows",
            a.len()
        )));
    }

    // Cholesky decomposition A = L L'
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                let scale = a[i][i].abs();
                if !sum.is_finite() || sum <= PIVOT_TOLERANCE * scale || scale == 0.0 {
                    return Err(MathError::Singular(format!(
                        "matrix is not positive definite at pivot {i}"
                    )));
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L' x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Ok(x)
}

/// Ordinary least squares for `target ≈ rows · beta` via the normal equations.
///
/// Each entry of `rows` is one observation's regressor vector.
pub fn least_squares(rows: &[Vec<f64>], target: &[f64]) -> Result<Vec<f64>> {
    if rows.len() != target.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but target has {} values",
            rows.len(),
            target.len()
        )));
    }

    let k = rows.first().map(Vec::len).unwrap_or(0);
    if k == 0 {
        return Err(MathError::InvalidInput("Design has no columns".to_string()));
    }
    if rows.len() < k {
        return Err(MathError::InsufficientData(format!(
            "Need at least {k} observations for {k} coefficients, have {}",
            rows.len()
        )));
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &y) in rows.iter().zip(target) {
        for i in 0..k {
            xty[i] += row[i] * y;
            for j in 0..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    solve_symmetric(&xtx, &xty)
}
