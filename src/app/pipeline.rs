//! The forecast pipeline, independent of CLI presentation.
//!
//! files -> parallel ingest -> ordered merge -> trend fit -> forecast

use log::info;

use crate::domain::RunConfig;
use crate::error::AppError;
use crate::forecast::{Forecast, forecast};
use crate::io::{Collected, collect_observations};

/// All computed outputs of a single run.
#[derive(Debug)]
pub struct RunOutput {
    pub collected: Collected,
    pub forecast: Forecast,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_forecast(config: &RunConfig) -> Result<RunOutput, AppError> {
    if config.files.is_empty() {
        return Err(AppError::new(2, "No input files given."));
    }

    info!("ingesting {} file(s)", config.files.len());
    let collected = collect_observations(&config.files, &config.ingest, &config.collect)?;
    let forecast = forecast(&collected.observations)?;

    Ok(RunOutput { collected, forecast })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    use chrono::NaiveDate;

    use crate::domain::{CollectOptions, FileErrorPolicy, IngestOptions};

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn config(files: Vec<PathBuf>) -> RunConfig {
        RunConfig {
            files,
            ingest: IngestOptions {
                temperature_column: "Temp".to_string(),
                ..IngestOptions::default()
            },
            collect: CollectOptions {
                max_workers: Some(2),
                ..CollectOptions::default()
            },
            export: None,
            summary: false,
        }
    }

    #[test]
    fn two_files_on_an_exact_line() {
        let dir = tempfile::tempdir().unwrap();
        let f1 = write(dir.path(), "f1.csv", "Data;Temp\n2023-01-01;20,0\n2023-01-02;22,0\n");
        let f2 = write(dir.path(), "f2.csv", "Data;Temp\n2023-01-03;24,0\n");

        let out = run_forecast(&config(vec![f1, f2])).unwrap();
        assert_eq!(out.collected.observations.len(), 3);

        let points = &out.forecast.points;
        assert_eq!(points.len(), 5);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2023, 1, 4).unwrap());
        assert!((points[0].predicted_temperature - 26.0).abs() < 1e-9);
        assert_eq!(points[4].date, NaiveDate::from_ymd_opt(2023, 1, 8).unwrap());
        assert!((points[4].predicted_temperature - 34.0).abs() < 1e-9);
    }

    #[test]
    fn failing_file_aborts_with_its_name() {
        let dir = tempfile::tempdir().unwrap();
        let f1 = write(dir.path(), "f1.csv", "Data;Temp\n2023-01-01;20,0\n2023-01-02;22,0\n");
        let missing = dir.path().join("station_missing.csv");

        let err = run_forecast(&config(vec![f1, missing])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("station_missing.csv"));
    }

    #[test]
    fn skipped_files_still_forecast_from_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.csv");
        let f1 = write(dir.path(), "f1.csv", "Data;Temp\n2023-01-01;20,0\n2023-01-02;22,0\n");

        let mut cfg = config(vec![missing, f1]);
        cfg.collect.on_file_error = FileErrorPolicy::Skip;
        let out = run_forecast(&cfg).unwrap();

        assert_eq!(out.collected.failures.len(), 1);
        assert!((out.forecast.points[0].predicted_temperature - 24.0).abs() < 1e-9);
    }

    #[test]
    fn all_rows_missing_is_a_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let f1 = write(dir.path(), "f1.csv", "Data;Temp\n2023-01-01;\n;21,0\n");

        let err = run_forecast(&config(vec![f1])).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn no_files_is_rejected() {
        let err = run_forecast(&config(Vec::new())).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
