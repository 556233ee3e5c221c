//! Export forecast points to CSV.
//!
//! Values are written at full precision so downstream tools can round as they
//! see fit.

use std::path::Path;

use crate::domain::ForecastPoint;
use crate::error::AppError;

/// Write `date,predicted_temperature` rows to a CSV file.
pub fn write_forecast_csv(path: &Path, points: &[ForecastPoint]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for p in points {
        writer
            .serialize(p)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV '{}': {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn writes_header_and_one_row_per_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.csv");
        let points = [
            ForecastPoint {
                date: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
                predicted_temperature: 21.5,
            },
            ForecastPoint {
                date: NaiveDate::from_ymd_opt(2023, 4, 2).unwrap(),
                predicted_temperature: 21.25,
            },
        ];

        write_forecast_csv(&path, &points).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines, vec!["date,predicted_temperature", "2023-04-01,21.5", "2023-04-02,21.25"]);
    }
}
