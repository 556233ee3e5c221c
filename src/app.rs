//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - runs ingest + forecast
//! - writes the optional export
//! - prints the forecast (and the summary when asked)

use std::time::Duration;

use clap::Parser;
use log::info;

use crate::cli::ForecastArgs;
use crate::domain::{CollectOptions, IngestOptions, RunConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `forecast` binary.
pub fn run() -> Result<(), AppError> {
    // Environment first, so `FORECAST_*` variables from `.env` reach clap.
    dotenvy::dotenv().ok();
    let args = ForecastArgs::parse();
    let config = run_config_from_args(&args)?;

    let run = pipeline::run_forecast(&config)?;

    if config.summary {
        eprint!("{}", crate::report::format_run_summary(&run.collected, &run.forecast));
    }

    // Export first: nothing reaches stdout if the export fails.
    if let Some(path) = &config.export {
        crate::io::export::write_forecast_csv(path, &run.forecast.points)?;
        info!("wrote forecast to '{}'", path.display());
    }

    print!("{}", crate::report::format_forecast(&run.forecast.points));
    Ok(())
}

pub fn run_config_from_args(args: &ForecastArgs) -> Result<RunConfig, AppError> {
    let delimiter = u8::try_from(args.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| AppError::new(2, format!("Delimiter must be a single ASCII character, got '{}'.", args.delimiter)))?;

    if args.workers == Some(0) {
        return Err(AppError::new(2, "`--workers` must be at least 1."));
    }
    if args.timeout_secs == Some(0) {
        return Err(AppError::new(2, "`--timeout-secs` must be at least 1."));
    }

    Ok(RunConfig {
        files: args.files.clone(),
        ingest: IngestOptions {
            date_column: args.date_column.clone(),
            temperature_column: args.temperature_column.clone(),
            delimiter,
            encoding: args.encoding,
            missing_markers: args.missing_values.clone(),
            on_malformed: args.on_malformed,
        },
        collect: CollectOptions {
            max_workers: args.workers,
            on_file_error: args.on_file_error,
            timeout: args.timeout_secs.map(Duration::from_secs),
        },
        export: args.export.clone(),
        summary: args.summary,
    })
}
