//! Error types for kakeibo-store

use std::io;
use thiserror::Error;

/// Coarse classification of store failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Zero or several candidate files for a month
    SourceNotFound,
    /// Read, write, decode or encode failure
    IoFailure,
    /// The input itself is unusable (bad year-month, column, cell value)
    InvalidInput,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid year-month '{value}': expected YYYYMM")]
    InvalidYearMonth { value: String },

    #[error("No CSV file found in {dir}")]
    SourceNotFound { dir: String },

    #[error("{count} CSV files found in {dir}, expected exactly one")]
    AmbiguousSource { dir: String, count: usize },

    #[error("Invalid file pattern {pattern}: {message}")]
    Pattern { pattern: String, message: String },

    #[error("Unknown text encoding '{label}'")]
    UnknownEncoding { label: String },

    #[error("Cannot decode {path} as {encoding}")]
    Decode { path: String, encoding: String },

    #[error("Cannot encode ledger for {path} as {encoding}")]
    Encode { path: String, encoding: String },

    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { path: String, column: String },

    #[error("Invalid value at {path}:{line}: {message}")]
    InvalidValue {
        path: String,
        line: u64,
        message: String,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::SourceNotFound { .. } | StoreError::AmbiguousSource { .. } => {
                StoreErrorKind::SourceNotFound
            }
            StoreError::Decode { .. }
            | StoreError::Encode { .. }
            | StoreError::Csv { .. }
            | StoreError::Io { .. } => StoreErrorKind::IoFailure,
            StoreError::InvalidYearMonth { .. }
            | StoreError::Pattern { .. }
            | StoreError::UnknownEncoding { .. }
            | StoreError::MissingColumn { .. }
            | StoreError::InvalidValue { .. } => StoreErrorKind::InvalidInput,
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
