//! Mathematical utilities: single-predictor least squares.

pub mod ols;

pub use ols::*;
