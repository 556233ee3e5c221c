//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the ingest/forecast code stays clean and testable
//! - output changes are localized

use crate::domain::ForecastPoint;
use crate::forecast::Forecast;
use crate::io::Collected;

/// One `Date: YYYY-MM-DD, Forecast: X.XX` line per point.
pub fn format_forecast(points: &[ForecastPoint]) -> String {
    let mut out = String::new();
    for p in points {
        out.push_str(&format!(
            "Date: {}, Forecast: {:.2}\n",
            p.date.format("%Y-%m-%d"),
            p.predicted_temperature
        ));
    }
    out
}

/// Dataset and fit diagnostics for the `--summary` flag.
pub fn format_run_summary(collected: &Collected, forecast: &Forecast) -> String {
    let mut out = String::new();

    out.push_str("=== station temperature forecast ===\n");
    out.push_str("Files:\n");
    for r in &collected.reports {
        out.push_str(&format!(
            "  {}: read={} used={} missing={} malformed={}\n",
            r.path.display(),
            r.rows_read,
            r.rows_used,
            r.rows_missing,
            r.rows_malformed
        ));
    }
    for f in &collected.failures {
        out.push_str(&format!("  {}: skipped ({})\n", f.path.display(), f.error));
    }

    let trend = &forecast.trend;
    out.push_str(&format!(
        "Observations: n={} | dates=[{}, {}]\n",
        trend.n_points,
        trend.axis.origin(),
        forecast.last_date
    ));
    out.push_str(&format!(
        "Trend: {:+.6} °C/day | intercept={:.3} °C @ {} | rmse={:.3} | R²={}\n",
        trend.slope_per_day,
        trend.intercept,
        trend.axis.origin(),
        trend.rmse,
        trend
            .r_squared
            .map(|r| format!("{r:.4}"))
            .unwrap_or_else(|| "-".to_string())
    ));

    out
}
