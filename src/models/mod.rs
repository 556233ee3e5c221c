//! Trend model used by the forecaster.
//!
//! The model is a plain value (`TrendLine`) with a pure `predict`, so the
//! forecasting code stays small and easy to test.

pub mod trend;

pub use trend::*;
