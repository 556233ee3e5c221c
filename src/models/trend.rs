//! Linear temperature trend over a day-count time axis.
//!
//! The forecaster relies on two primitive operations:
//! - encode a date onto the numeric axis used for fitting (`TimeAxis::encode`)
//! - predict the temperature for a date from the fitted line (`TrendLine::predict`)
//!
//! Fitting and prediction must use the same axis, so `TrendLine` owns it.

use chrono::NaiveDate;

use crate::math::LineFit;

/// Whole days since `origin`.
///
/// Monotonic in calendar date with a resolution of one day. Values stay small
/// (thousands at most for multi-year station histories), unlike epoch-based
/// timestamp encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeAxis {
    origin: NaiveDate,
}

impl TimeAxis {
    pub fn new(origin: NaiveDate) -> Self {
        Self { origin }
    }

    pub fn origin(&self) -> NaiveDate {
        self.origin
    }

    pub fn encode(&self, date: NaiveDate) -> f64 {
        (date - self.origin).num_days() as f64
    }
}

/// Fitted `temperature = slope_per_day · t + intercept` plus fit diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    pub axis: TimeAxis,
    /// °C per day.
    pub slope_per_day: f64,
    /// °C at the axis origin.
    pub intercept: f64,
    pub n_points: usize,
    pub rmse: f64,
    /// `None` when the observed temperatures have zero variance.
    pub r_squared: Option<f64>,
}

impl TrendLine {
    /// Evaluate the line on the axis it was fitted on.
    pub fn predict(&self, date: NaiveDate) -> f64 {
        self.line().eval(self.axis.encode(date))
    }

    fn line(&self) -> LineFit {
        LineFit {
            slope: self.slope_per_day,
            intercept: self.intercept,
        }
    }
}
