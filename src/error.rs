//! Top-level error type and exit-code mapping.
//!
//! Each stage has its own typed error (`IngestError`, `CollectError`,
//! `ForecastError`). They all fold into `AppError`, which carries the process
//! exit code:
//!
//! - `2`: input problems (I/O, format, configuration)
//! - `3`: not enough usable data to forecast
//! - `4`: numerical or runtime failures (solver, timeout, worker panic)
//!
//! `AppError` is the only error `main` sees: it prints the message and exits
//! with the code. Messages already name the failing file or data condition.

use crate::forecast::ForecastError;
use crate::io::{CollectError, IngestError};

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        AppError::new(2, err.to_string())
    }
}

impl From<CollectError> for AppError {
    fn from(err: CollectError) -> Self {
        match err {
            CollectError::Ingest(inner) => inner.into(),
            other => AppError::new(4, other.to_string()),
        }
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        let code = match err {
            ForecastError::InsufficientData { .. } | ForecastError::DegenerateInput { .. } => 3,
            ForecastError::Numerical(_) => 4,
        };
        AppError::new(code, err.to_string())
    }
}
