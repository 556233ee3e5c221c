//! Trend fitting and next-days forecast.
//!
//! Given the merged observation series we:
//! - encode each date as days since the earliest observed date
//! - fit one OLS line through all `(t, temperature)` pairs
//! - evaluate the line for the `HORIZON_DAYS` days after the latest date
//!
//! Everything here is deterministic: the same series always produces the same
//! bits.

use chrono::{Days, NaiveDate};
use log::{debug, info};
use thiserror::Error;

use crate::domain::{ForecastPoint, HORIZON_DAYS, Observation};
use crate::math::fit_line;
use crate::models::{TimeAxis, TrendLine};

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Not enough data to forecast: {n} usable observation(s), at least 2 required.")]
    InsufficientData { n: usize },

    #[error("Cannot fit a trend: every observation is dated {date}.")]
    DegenerateInput { date: NaiveDate },

    #[error("Trend fit failed: {0}")]
    Numerical(String),
}

/// Fitted trend plus the forecast derived from it.
#[derive(Debug, Clone)]
pub struct Forecast {
    pub trend: TrendLine,
    pub last_date: NaiveDate,
    /// Exactly `HORIZON_DAYS` points, chronological.
    pub points: Vec<ForecastPoint>,
}

/// Fit the trend and forecast the days following the latest observation.
pub fn forecast(observations: &[Observation]) -> Result<Forecast, ForecastError> {
    let trend = fit_trend(observations)?;
    let last_date = observations
        .iter()
        .map(Observation::date)
        .max()
        .ok_or(ForecastError::InsufficientData { n: 0 })?;

    let mut points = Vec::with_capacity(HORIZON_DAYS);
    for offset in 1..=HORIZON_DAYS as u64 {
        let date = last_date
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| ForecastError::Numerical(format!("date overflow after {last_date}")))?;
        let predicted_temperature = trend.predict(date);
        if !predicted_temperature.is_finite() {
            return Err(ForecastError::Numerical(format!("non-finite prediction for {date}")));
        }
        points.push(ForecastPoint {
            date,
            predicted_temperature,
        });
    }

    info!(
        "forecast {} day(s) after {last_date} from {} observation(s)",
        points.len(),
        trend.n_points
    );

    Ok(Forecast {
        trend,
        last_date,
        points,
    })
}

/// Fit `temperature ≈ a·t + b` with `t` in days since the earliest date.
pub fn fit_trend(observations: &[Observation]) -> Result<TrendLine, ForecastError> {
    let n = observations.len();
    if n < 2 {
        return Err(ForecastError::InsufficientData { n });
    }

    let mut first = observations[0].date();
    let mut last = first;
    for obs in &observations[1..] {
        first = first.min(obs.date());
        last = last.max(obs.date());
    }
    if first == last {
        return Err(ForecastError::DegenerateInput { date: first });
    }

    let axis = TimeAxis::new(first);
    let t: Vec<f64> = observations.iter().map(|o| axis.encode(o.date())).collect();
    let y: Vec<f64> = observations.iter().map(Observation::temperature).collect();

    let line = fit_line(&t, &y)
        .ok_or_else(|| ForecastError::Numerical("least-squares solve was singular or non-finite".to_string()))?;

    let (rmse, r_squared) = fit_quality(&t, &y, |ti| line.eval(ti));
    debug!(
        "trend over {first}..{last}: slope={:.6} °C/day, intercept={:.4} °C, rmse={rmse:.4}",
        line.slope, line.intercept
    );

    Ok(TrendLine {
        axis,
        slope_per_day: line.slope,
        intercept: line.intercept,
        n_points: n,
        rmse,
        r_squared,
    })
}

fn fit_quality(t: &[f64], y: &[f64], predict: impl Fn(f64) -> f64) -> (f64, Option<f64>) {
    let n = y.len() as f64;
    let y_mean = y.iter().sum::<f64>() / n;

    let mut sse = 0.0;
    let mut sst = 0.0;
    for (&ti, &yi) in t.iter().zip(y) {
        let r = yi - predict(ti);
        sse += r * r;
        sst += (yi - y_mean) * (yi - y_mean);
    }

    let rmse = (sse / n).sqrt();
    let r_squared = (sst > 0.0).then(|| 1.0 - sse / sst);
    (rmse, r_squared)
}
