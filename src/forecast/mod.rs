//! Forecasting: fit the temperature trend and project it forward.

pub mod forecaster;

pub use forecaster::*;
