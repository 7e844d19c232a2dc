//! # AQI Math
//!
//! Numeric kernels shared by the air-quality forecasting crates.
//! This crate provides the pieces the models are assembled from:
//!
//! - trailing moving averages with an explicit "not yet defined" marker
//! - sample statistics over finite values
//! - differencing and integration of series
//! - symmetric positive definite solves for least-squares fits
//! - Nelder-Mead simplex minimization

use thiserror::Error;

pub mod differencing;
pub mod linalg;
pub mod moving_averages;
pub mod optimization;
pub mod statistics;

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Singular system: {0}")]
    Singular(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;
