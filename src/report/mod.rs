//! Reporting: forecast lines and the run summary.

pub mod format;

pub use format::*;
