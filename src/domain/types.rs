//! Shared domain types.
//!
//! These are the values that flow between pipeline stages:
//!
//! - validated observations (`Observation`)
//! - forecast output (`ForecastPoint`)
//! - run configuration (`IngestOptions`, `CollectOptions`, `RunConfig`)

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default INMET column holding the observation date.
pub const DEFAULT_DATE_COLUMN: &str = "Data";

/// Default INMET column holding the hourly dry-bulb air temperature.
pub const DEFAULT_TEMPERATURE_COLUMN: &str = "TEMPERATURA DO AR - BULBO SECO, HORARIA (°C)";

/// Number of days forecast after the latest observation.
pub const HORIZON_DAYS: usize = 5;

/// One validated `(date, temperature)` reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    date: NaiveDate,
    temperature: f64,
}

impl Observation {
    /// Returns `None` when `temperature` is not finite.
    pub fn new(date: NaiveDate, temperature: f64) -> Option<Self> {
        temperature.is_finite().then_some(Self { date, temperature })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Degrees Celsius.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}

/// A single forecast day.
///
/// `predicted_temperature` is kept at full precision; rounding happens only
/// when formatting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_temperature: f64,
}

/// Text encoding of the input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// ISO-8859-1. Every byte maps to the code point of the same value.
    Latin1,
    /// Strict UTF-8; invalid byte sequences are a format error.
    Utf8,
}

/// What to do with a non-empty value that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Fail the file with a format error naming the line.
    Fail,
    /// Drop the row and record it in the ingest report.
    Skip,
}

/// What the collector does when a whole file cannot be ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileErrorPolicy {
    /// Fail the run with the first failing file (in path-list order).
    Abort,
    /// Report the file as a gap and continue with the others.
    Skip,
}

/// Per-file parsing options.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub date_column: String,
    pub temperature_column: String,
    pub delimiter: u8,
    pub encoding: Encoding,
    /// Values treated the same as an empty field (e.g. `-9999`).
    pub missing_markers: Vec<String>,
    pub on_malformed: MalformedPolicy,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            temperature_column: DEFAULT_TEMPERATURE_COLUMN.to_string(),
            delimiter: b';',
            encoding: Encoding::Latin1,
            missing_markers: Vec::new(),
            on_malformed: MalformedPolicy::Fail,
        }
    }
}

/// Options for fanning ingestion out over several files.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Worker pool size. `None` uses rayon's default (available parallelism).
    pub max_workers: Option<usize>,
    pub on_file_error: FileErrorPolicy,
    /// Overall ingestion deadline.
    pub timeout: Option<Duration>,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            max_workers: None,
            on_file_error: FileErrorPolicy::Abort,
            timeout: None,
        }
    }
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub files: Vec<PathBuf>,
    pub ingest: IngestOptions,
    pub collect: CollectOptions,
    pub export: Option<PathBuf>,
    pub summary: bool,
}
