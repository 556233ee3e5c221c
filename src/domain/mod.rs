//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the validated `Observation` value and the `ForecastPoint` output
//! - input configuration enums (`Encoding`, `MalformedPolicy`, `FileErrorPolicy`)
//! - resolved run configuration (`IngestOptions`, `CollectOptions`, `RunConfig`)

pub mod types;

pub use types::*;
