//! Error types for weather intelligence.

use thiserror::Error;

/// Result type alias for weather intelligence operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for weather intelligence.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid priors: {0}")]
    InvalidPriors(String),

    #[error("schema validation failed: {0}")]
    SchemaValidation(String),

    // Input errors (20-29)
    #[error("unknown brand: {0}")]
    UnknownBrand(String),

    #[error("unknown state code: {0}")]
    UnknownState(String),

    #[error("unknown metro id: {0}")]
    UnknownMetro(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Learning errors (30-39)
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("numerical instability detected: {0}")]
    NumericalInstability(String),

    #[error("registry snapshot incompatible: {0}")]
    SnapshotIncompatible(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidPriors(_) => 11,
            Error::SchemaValidation(_) => 12,
            Error::UnknownBrand(_) => 20,
            Error::UnknownState(_) => 21,
            Error::UnknownMetro(_) => 22,
            Error::InvalidInput(_) => 23,
            Error::DimensionMismatch { .. } => 30,
            Error::NumericalInstability(_) => 31,
            Error::SnapshotIncompatible(_) => 32,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// True for errors caused by caller-supplied input rather than
    /// configuration or the environment.
    pub fn is_input_error(&self) -> bool {
        (20..30).contains(&self.code())
    }
}
