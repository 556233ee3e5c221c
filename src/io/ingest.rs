//! CSV ingest and normalization for station exports.
//!
//! This module turns one semicolon-delimited station export into an ordered
//! list of validated `Observation`s.
//!
//! Design goals:
//! - **Strict schema** for the two required columns, addressed by header name
//! - **Row-level tolerance** (rows with missing fields are skipped and counted)
//! - **Explicit malformed-value policy** (`fail` or `skip`, never implicit)
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use log::{debug, warn};
use thiserror::Error;

use crate::domain::{Encoding, IngestOptions, MalformedPolicy, Observation};

/// How many leading lines may precede the header (station metadata block).
const MAX_PREAMBLE_LINES: usize = 32;

/// Accepted native date formats.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode '{}' as {encoding:?}: {message}", .path.display())]
    Decode {
        path: PathBuf,
        encoding: Encoding,
        message: String,
    },

    #[error("Missing required column `{column}` in '{}'", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("Malformed value in '{}' at line {line}: {message}", .path.display())]
    Format {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// A row dropped under `MalformedPolicy::Skip`.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIssue {
    pub line: usize,
    pub message: String,
}

/// What happened while ingesting one file.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub path: PathBuf,
    pub rows_read: usize,
    pub rows_used: usize,
    /// Rows without a date or temperature value.
    pub rows_missing: usize,
    /// Rows dropped as malformed (only non-zero under `MalformedPolicy::Skip`).
    pub rows_malformed: usize,
    pub issues: Vec<RowIssue>,
}

/// Ingest output for a single file.
#[derive(Debug, Clone)]
pub struct IngestedFile {
    pub observations: Vec<Observation>,
    pub report: IngestReport,
}

enum RowOutcome {
    Keep(Observation),
    Missing,
    Malformed(String),
}

/// Read, decode and parse one station export.
pub fn ingest_file(path: &Path, opts: &IngestOptions) -> Result<IngestedFile, IngestError> {
    let bytes = read_bytes(path)?;
    let text = decode(bytes, opts.encoding).map_err(|message| IngestError::Decode {
        path: path.to_path_buf(),
        encoding: opts.encoding,
        message,
    })?;
    ingest_str(path, &text, opts)
}

/// Parse already-decoded file contents. `path` is used for reporting only.
pub fn ingest_str(path: &Path, text: &str, opts: &IngestOptions) -> Result<IngestedFile, IngestError> {
    let date_key = normalize_header_name(&opts.date_column);
    let temp_key = normalize_header_name(&opts.temperature_column);

    let (header_offset, header_line) =
        locate_header(text, opts.delimiter, &date_key).ok_or_else(|| IngestError::MissingColumn {
            path: path.to_path_buf(),
            column: opts.date_column.clone(),
        })?;
    if header_line > 1 {
        debug!(
            "'{}': skipped {} preamble line(s) before the header",
            path.display(),
            header_line - 1
        );
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(opts.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text[header_offset..].as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| IngestError::Format {
            path: path.to_path_buf(),
            line: header_line,
            message: format!("unreadable header: {e}"),
        })?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = require_column(&header_map, &date_key, path, &opts.date_column)?;
    let temp_idx = require_column(&header_map, &temp_key, path, &opts.temperature_column)?;

    let mut observations = Vec::new();
    let mut issues = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_missing = 0usize;
    let mut rows_malformed = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // The reader skips blank lines, so take the line from its position.
        // Positions are 1-based within the reader, whose line 1 is the header.
        let position = match &result {
            Ok(record) => record.position(),
            Err(e) => e.position(),
        };
        let line = position.map_or(header_line + idx + 1, |p| header_line - 1 + p.line() as usize);
        rows_read += 1;

        let outcome = match result {
            Ok(record) => parse_row(&record, date_idx, temp_idx, &opts.missing_markers),
            Err(e) => RowOutcome::Malformed(format!("CSV parse error: {e}")),
        };

        match outcome {
            RowOutcome::Keep(obs) => observations.push(obs),
            RowOutcome::Missing => rows_missing += 1,
            RowOutcome::Malformed(message) => match opts.on_malformed {
                MalformedPolicy::Fail => {
                    return Err(IngestError::Format {
                        path: path.to_path_buf(),
                        line,
                        message,
                    });
                }
                MalformedPolicy::Skip => {
                    rows_malformed += 1;
                    issues.push(RowIssue { line, message });
                }
            },
        }
    }

    if rows_malformed > 0 {
        warn!(
            "'{}': dropped {rows_malformed} malformed row(s); first at line {}",
            path.display(),
            issues[0].line
        );
    }
    debug!(
        "'{}': {} of {rows_read} row(s) used, {rows_missing} missing",
        path.display(),
        observations.len()
    );

    let report = IngestReport {
        path: path.to_path_buf(),
        rows_read,
        rows_used: observations.len(),
        rows_missing,
        rows_malformed,
        issues,
    };

    Ok(IngestedFile { observations, report })
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, IngestError> {
    let io_err = |source: std::io::Error| IngestError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(io_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(io_err)?;
    Ok(bytes)
}

fn decode(bytes: Vec<u8>, encoding: Encoding) -> Result<String, String> {
    match encoding {
        Encoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        Encoding::Utf8 => String::from_utf8(bytes).map_err(|e| e.to_string()),
    }
}

/// Find the header line: the first line whose fields include the date column.
///
/// Returns the byte offset where the header starts and its 1-based line number.
fn locate_header(text: &str, delimiter: u8, date_key: &str) -> Option<(usize, usize)> {
    let mut offset = 0usize;
    for (i, line) in text.split_inclusive('\n').take(MAX_PREAMBLE_LINES).enumerate() {
        if let Some(fields) = split_fields(line, delimiter) {
            if fields.iter().any(|f| normalize_header_name(f) == date_key) {
                return Some((offset, i + 1));
            }
        }
        offset += line.len();
    }
    None
}

fn split_fields(line: &str, delimiter: u8) -> Option<StringRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    reader.records().next()?.ok()
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins on duplicate names.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.to_ascii_lowercase()
}

fn require_column(
    header_map: &HashMap<String, usize>,
    key: &str,
    path: &Path,
    column: &str,
) -> Result<usize, IngestError> {
    header_map.get(key).copied().ok_or_else(|| IngestError::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
    })
}

fn parse_row(record: &StringRecord, date_idx: usize, temp_idx: usize, markers: &[String]) -> RowOutcome {
    let (Some(date_raw), Some(temp_raw)) = (
        get_value(record, date_idx, markers),
        get_value(record, temp_idx, markers),
    ) else {
        return RowOutcome::Missing;
    };

    let date = match parse_date(date_raw) {
        Ok(d) => d,
        Err(e) => return RowOutcome::Malformed(e),
    };
    let temperature = match parse_temperature(temp_raw) {
        Ok(t) => t,
        Err(e) => return RowOutcome::Malformed(e),
    };

    match Observation::new(date, temperature) {
        Some(obs) => RowOutcome::Keep(obs),
        None => RowOutcome::Malformed(format!("Non-finite temperature '{temp_raw}'.")),
    }
}

fn get_value<'a>(record: &'a StringRecord, idx: usize, markers: &[String]) -> Option<&'a str> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty() && !markers.iter().any(|m| m == s))
}

/// Parse a temperature written with a decimal comma (`"23,5"` -> `23.5`).
pub fn parse_temperature(s: &str) -> Result<f64, String> {
    let normalized = s.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(format!("Non-finite temperature '{s}'.")),
        Err(_) => Err(format!("Invalid temperature '{s}'.")),
    }
}

/// Parse a date in one of the station export formats.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY, DD-MM-YYYY."
    ))
}
