//! ARIMA models for time series forecasting
//!
//! Coefficients are estimated by minimizing the conditional sum of squares
//! (CSS) with a Nelder-Mead simplex that starts from the least-squares AR
//! solution. With Gaussian innovations the CSS minimizer is also the
//! conditional maximum-likelihood estimate, so the log-likelihood and the
//! information criteria follow from the concentrated residual variance.
//!
//! An intercept is only estimated for undifferenced models (`d == 0`); an
//! integrated model forecasts without drift.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::{FitDiagnostics, ForecastModel, ForecastResult, TrainedForecastModel};
use aqi_math::differencing::{difference, integrate};
use aqi_math::linalg::least_squares;
use aqi_math::optimization::{nelder_mead, NelderMeadConfig};
use aqi_math::MathError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, instrument};

/// MA coefficients are kept inside the invertible region.
const MA_BOUND: f64 = 0.99;

/// Residual variance below this fraction of the signal's power counts as a
/// degenerate (perfect) fit.
const MIN_RELATIVE_VARIANCE: f64 = 1e-12;

/// Model order `(p, d, q)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// AR order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// MA order
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Whether a mean term is estimated alongside the coefficients
    pub fn has_intercept(&self) -> bool {
        self.d == 0
    }

    /// Free parameters in the likelihood, innovation variance included
    pub fn num_params(&self) -> usize {
        self.p + self.q + usize::from(self.has_intercept()) + 1
    }

    /// Shortest series the model accepts: `d` readings are lost to
    /// differencing, `max(p, q)` to the lag window, and the rest must leave at
    /// least one observation per free parameter.
    pub fn min_observations(&self) -> usize {
        self.d + self.p.max(self.q) + self.num_params()
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(5, 1, 0)
    }
}

impl std::fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// Model order
    order: ArimaOrder,
    /// Optimizer settings for the CSS minimization
    optimizer: NelderMeadConfig,
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArimaModel {
    /// Name of the model
    name: String,
    /// Model order
    order: ArimaOrder,
    /// Mean of the differenced series (zero without an intercept)
    intercept: f64,
    /// Fitted AR coefficients
    ar_coefficients: Vec<f64>,
    /// Fitted MA coefficients
    ma_coefficients: Vec<f64>,
    /// Training series, needed to integrate and timestamp forecasts
    history: TimeSeries,
    /// Differenced training values
    differenced: Vec<f64>,
    /// One-step fitted values on the differenced scale
    fitted: Vec<Option<f64>>,
    /// Residuals on the differenced scale (zero before the first fitted point)
    residuals: Vec<f64>,
    /// Fit diagnostics
    diagnostics: FitDiagnostics,
}

impl ArimaModel {
    /// Create a new ARIMA model
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self::with_order(ArimaOrder::new(p, d, q))
    }

    /// Create a new ARIMA model from an order
    pub fn with_order(order: ArimaOrder) -> Self {
        Self {
            name: order.to_string(),
            order,
            optimizer: NelderMeadConfig::default(),
        }
    }

    /// Replace the optimizer settings
    pub fn with_optimizer(mut self, optimizer: NelderMeadConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Starting point for the simplex: mean, least-squares AR terms, zero MA terms
    fn initial_parameters(&self, diff: &[f64], mean: f64) -> Result<Vec<f64>> {
        let ArimaOrder { p, q, .. } = self.order;
        let mut initial = Vec::with_capacity(p + q + 1);
        if self.order.has_intercept() {
            initial.push(mean);
        }

        if p > 0 {
            let rows: Vec<Vec<f64>> = (p..diff.len())
                .map(|t| (1..=p).map(|lag| diff[t - lag] - mean).collect())
                .collect();
            let target: Vec<f64> = diff[p..].iter().map(|v| v - mean).collect();

            let ar = least_squares(&rows, &target).map_err(|err| match err {
                MathError::Singular(reason) => ForecastError::ModelFitFailure(format!(
                    "singular autoregressive design ({reason}); the series is constant or \
                     too regular to identify {}",
                    self.order
                )),
                other => ForecastError::ModelFitFailure(other.to_string()),
            })?;
            initial.extend(ar);
        }

        initial.extend(std::iter::repeat(0.0).take(q));
        Ok(initial)
    }

    fn bounds(&self) -> Vec<(f64, f64)> {
        let ArimaOrder { p, q, .. } = self.order;
        let mut bounds = Vec::with_capacity(p + q + 1);
        if self.order.has_intercept() {
            bounds.push((f64::NEG_INFINITY, f64::INFINITY));
        }
        bounds.extend(std::iter::repeat((f64::NEG_INFINITY, f64::INFINITY)).take(p));
        bounds.extend(std::iter::repeat((-MA_BOUND, MA_BOUND)).take(q));
        bounds
    }

    /// Split a flat parameter vector into `(intercept, ar, ma)`
    fn unpack<'a>(&self, params: &'a [f64]) -> (f64, &'a [f64], &'a [f64]) {
        let offset = usize::from(self.order.has_intercept());
        let intercept = if offset == 1 { params[0] } else { 0.0 };
        let (ar, ma) = params[offset..].split_at(self.order.p);
        (intercept, ar, ma)
    }
}

/// One-step predictions and residuals of an ARMA recursion on `diff`
fn arma_recursion(
    diff: &[f64],
    start: usize,
    intercept: f64,
    ar: &[f64],
    ma: &[f64],
) -> (Vec<Option<f64>>, Vec<f64>) {
    let mut fitted = vec![None; diff.len()];
    let mut residuals = vec![0.0; diff.len()];

    for t in start..diff.len() {
        let mut pred = intercept;
        for (i, phi) in ar.iter().enumerate() {
            pred += phi * (diff[t - 1 - i] - intercept);
        }
        for (i, theta) in ma.iter().enumerate() {
            pred += theta * residuals[t - 1 - i];
        }
        fitted[t] = Some(pred);
        residuals[t] = diff[t] - pred;
    }

    (fitted, residuals)
}

fn conditional_sum_of_squares(residuals: &[f64], start: usize) -> f64 {
    let css: f64 = residuals[start..].iter().map(|r| r * r).sum();
    if css.is_finite() {
        css
    } else {
        f64::MAX
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArimaModel;

    #[instrument(skip(self, data), fields(model = %self.name, n = data.len()))]
    fn train(&self, data: &TimeSeries) -> Result<TrainedArimaModel> {
        let values = data.values();
        let needed = self.order.min_observations();
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                model: self.name.clone(),
                needed,
                got: values.len(),
            });
        }

        let ArimaOrder { p, q, .. } = self.order;
        let diff = difference(values, self.order.d);
        let start = p.max(q);
        let n_obs = diff.len() - start;

        let mean = if self.order.has_intercept() {
            aqi_math::statistics::mean(&diff).unwrap_or(0.0)
        } else {
            0.0
        };
        let initial = self.initial_parameters(&diff, mean)?;
        let bounds = self.bounds();

        let objective = |params: &[f64]| {
            let (intercept, ar, ma) = self.unpack(params);
            let (_, residuals) = arma_recursion(&diff, start, intercept, ar, ma);
            conditional_sum_of_squares(&residuals, start)
        };
        let result = nelder_mead(objective, &initial, Some(&bounds), self.optimizer);
        debug!(
            iterations = result.iterations,
            converged = result.converged,
            css = result.optimal_value,
            "css minimization finished"
        );

        if !result.converged {
            return Err(ForecastError::ModelFitFailure(format!(
                "optimizer did not converge after {} iterations",
                result.iterations
            )));
        }
        if !result.optimal_value.is_finite() || result.optimal_value == f64::MAX {
            return Err(ForecastError::ModelFitFailure(
                "objective is not finite at the optimum".to_string(),
            ));
        }

        let (intercept, ar, ma) = self.unpack(&result.optimal_point);
        let (fitted, residuals) = arma_recursion(&diff, start, intercept, ar, ma);

        let n = n_obs as f64;
        let sigma2 = conditional_sum_of_squares(&residuals, start) / n;
        let power = diff.iter().map(|v| v * v).sum::<f64>() / diff.len() as f64;
        if !sigma2.is_finite() || sigma2 <= MIN_RELATIVE_VARIANCE * power {
            return Err(ForecastError::ModelFitFailure(format!(
                "residual variance {sigma2:e} is degenerate; the likelihood is unbounded"
            )));
        }

        let log_likelihood = -0.5 * n * ((2.0 * PI).ln() + sigma2.ln() + 1.0);
        let k = self.order.num_params() as f64;
        let diagnostics = FitDiagnostics {
            aic: -2.0 * log_likelihood + 2.0 * k,
            bic: -2.0 * log_likelihood + k * n.ln(),
            hqic: -2.0 * log_likelihood + 2.0 * k * n.ln().ln(),
            log_likelihood,
            sigma2,
            order: self.order,
            n_obs,
            iterations: result.iterations,
        };
        debug!(aic = diagnostics.aic, sigma2, "arima fit accepted");

        Ok(TrainedArimaModel {
            name: self.name.clone(),
            order: self.order,
            intercept,
            ar_coefficients: ar.to_vec(),
            ma_coefficients: ma.to_vec(),
            history: data.clone(),
            differenced: diff,
            fitted,
            residuals,
            diagnostics,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedArimaModel {
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Get AR coefficients
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    /// Get MA coefficients
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    /// One-step fitted values on the differenced scale; `None` where the
    /// recursion had no lagged values yet
    pub fn fitted_values(&self) -> &[Option<f64>] {
        &self.fitted
    }

    /// Residuals on the differenced scale
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    pub fn diagnostics(&self) -> &FitDiagnostics {
        &self.diagnostics
    }
}

impl TrainedForecastModel for TrainedArimaModel {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        let mut extended = self.differenced.clone();
        let mut shocks = self.residuals.clone();

        for _ in 0..horizon {
            let t = extended.len();
            let mut pred = self.intercept;
            for (i, phi) in self.ar_coefficients.iter().enumerate() {
                pred += phi * (extended[t - 1 - i] - self.intercept);
            }
            for (i, theta) in self.ma_coefficients.iter().enumerate() {
                pred += theta * shocks[t - 1 - i];
            }
            extended.push(pred);
            // Future shocks have zero expectation
            shocks.push(0.0);
        }

        let steps = &extended[self.differenced.len()..];
        let values = integrate(steps, self.history.values(), self.order.d);
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFitFailure(
                "forecast diverged to non-finite values".to_string(),
            ));
        }

        let timestamps = self.history.future_timestamps(horizon)?;
        let forecast = ForecastResult::new(self.name.clone(), timestamps, values)?;
        Ok(forecast.with_diagnostics(self.diagnostics))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
