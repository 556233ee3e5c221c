//! Input/output helpers.
//!
//! - single-file CSV ingest + validation (`ingest`)
//! - parallel ingest across the file list (`collect`)
//! - forecast export (CSV) (`export`)

pub mod collect;
pub mod export;
pub mod ingest;

pub use collect::*;
pub use export::*;
pub use ingest::*;
