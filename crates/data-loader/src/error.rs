//! Error types for the data-loader crate.
//!
//! Every failure carries enough context (file, line, field) to point at the
//! offending cell in the catalog files.

use thiserror::Error;

/// Errors that can occur during catalog loading and parsing
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Header row doesn't match the expected column layout
    #[error("Unexpected header in {file}: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        file: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// The same movie identifier appears on more than one row
    #[error("Duplicate movie id {id}")]
    DuplicateId { id: u32 },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
