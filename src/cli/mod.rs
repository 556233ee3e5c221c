//! Command-line parsing for the station temperature forecaster.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! ingest/forecast code. Arguments are turned into plain config structs by
//! `app::run_config_from_args`.

use std::path::PathBuf;

use clap::Parser;

use crate::domain::{DEFAULT_DATE_COLUMN, DEFAULT_TEMPERATURE_COLUMN, Encoding, FileErrorPolicy, MalformedPolicy};

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "forecast",
    version,
    about = "Forecast the next five days of air temperature from station CSV exports"
)]
pub struct ForecastArgs {
    /// Station CSV files, in the order their observations are merged.
    #[arg(env = "FORECAST_FILES", value_delimiter = ',', required = true, value_name = "CSV")]
    pub files: Vec<PathBuf>,

    /// Header of the date column.
    #[arg(long, default_value = DEFAULT_DATE_COLUMN)]
    pub date_column: String,

    /// Header of the dry-bulb air temperature column.
    #[arg(long, default_value = DEFAULT_TEMPERATURE_COLUMN)]
    pub temperature_column: String,

    /// Field delimiter (single ASCII character).
    #[arg(long, default_value_t = ';')]
    pub delimiter: char,

    /// Text encoding of the input files.
    #[arg(long, value_enum, default_value_t = Encoding::Latin1)]
    pub encoding: Encoding,

    /// Value treated as missing, like an empty field (repeatable, e.g. `-9999`).
    #[arg(long = "missing-value", value_name = "VALUE", allow_hyphen_values = true)]
    pub missing_values: Vec<String>,

    /// What to do with a date or temperature that cannot be parsed.
    #[arg(long, value_enum, default_value_t = MalformedPolicy::Fail)]
    pub on_malformed: MalformedPolicy,

    /// What to do when a whole file cannot be read or has no required columns.
    #[arg(long, value_enum, default_value_t = FileErrorPolicy::Abort)]
    pub on_file_error: FileErrorPolicy,

    /// Maximum number of files ingested in parallel (default: available cores).
    #[arg(long, env = "FORECAST_WORKERS")]
    pub workers: Option<usize>,

    /// Abort if ingestion takes longer than this many seconds.
    #[arg(long, env = "FORECAST_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Export the forecast to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Print dataset and fit diagnostics to stderr.
    #[arg(long)]
    pub summary: bool,
}
