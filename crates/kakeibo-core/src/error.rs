//! Error types for kakeibo-core
//!
//! This module provides error handling for the ledger pipeline and the
//! dashboard, including error codes, detailed messages, and suggestions.

use kakeibo_store::{StoreError, StoreErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No (or more than one) source file for the month
    SourceNotFound,
    /// Read, write or text-encoding failure
    IoError,
    /// Input present but unusable
    InvalidFormat,
    /// No balance anywhere in the month
    NoBalance,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::SourceNotFound => write!(f, "SOURCE_NOT_FOUND"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::NoBalance => write!(f, "NO_BALANCE"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            suggestions: vec![],
        }
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for kakeibo-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No balance reported anywhere in {year_month}")]
    NoBalance { year_month: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Store(e) => match e.kind() {
                StoreErrorKind::SourceNotFound => ErrorCode::SourceNotFound,
                StoreErrorKind::IoFailure => ErrorCode::IoError,
                StoreErrorKind::InvalidInput => ErrorCode::InvalidFormat,
            },
            CoreError::NoBalance { .. } => ErrorCode::NoBalance,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self.code() {
            ErrorCode::NoBalance => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::Store(StoreError::SourceNotFound { dir }) => {
                details = details.with_suggestion(format!(
                    "Place the month's CSV export in {}.",
                    dir
                ));
                details = details.with_suggestion(
                    "Run `kakeibo build` for the month before serving the dashboard.".to_string(),
                );
            }
            CoreError::Store(StoreError::AmbiguousSource { dir, .. }) => {
                details = details.with_suggestion(format!(
                    "Keep exactly one CSV export in {}.",
                    dir
                ));
            }
            CoreError::Store(StoreError::Decode { encoding, .. }) => {
                details = details.with_suggestion(format!(
                    "Check that the file is saved as {} or adjust the configured encoding.",
                    encoding
                ));
            }
            CoreError::Store(StoreError::MissingColumn { .. }) => {
                details = details.with_suggestion(
                    "Check the preamble length (cashtrade.skip_rows) of the export.".to_string(),
                );
            }
            CoreError::NoBalance { .. } => {
                details = details.with_suggestion(
                    "The export has no 現在（貸付）高 value; the month cannot be reconstructed."
                        .to_string(),
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::SourceNotFound.to_string(), "SOURCE_NOT_FOUND");
        assert_eq!(ErrorCode::IoError.to_string(), "IO_ERROR");
        assert_eq!(ErrorCode::NoBalance.to_string(), "NO_BALANCE");
    }

    #[test]
    fn test_store_errors_map_to_codes() {
        let error: CoreError = StoreError::AmbiguousSource {
            dir: "raw/202401".to_string(),
            count: 2,
        }
        .into();
        assert_eq!(error.code(), ErrorCode::SourceNotFound);
        assert_eq!(error.severity(), ErrorSeverity::Error);

        let error: CoreError = StoreError::Decode {
            path: "raw/202401/a.csv".to_string(),
            encoding: "Shift_JIS".to_string(),
        }
        .into();
        assert_eq!(error.code(), ErrorCode::IoError);

        let error: CoreError = StoreError::MissingColumn {
            path: "a.csv".to_string(),
            column: "取引日".to_string(),
        }
        .into();
        assert_eq!(error.code(), ErrorCode::InvalidFormat);
    }

    #[test]
    fn test_error_details_source_not_found() {
        let error: CoreError = StoreError::SourceNotFound {
            dir: "raw/202401".to_string(),
        }
        .into();
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::SourceNotFound);
        assert_eq!(details.suggestions.len(), 2);
        assert!(details.message.contains("raw/202401"));
    }

    #[test]
    fn test_no_balance_severity() {
        let error = CoreError::NoBalance {
            year_month: "202401".to_string(),
        };
        assert_eq!(error.severity(), ErrorSeverity::Warning);
        assert!(error.to_details().to_string().contains("[NO_BALANCE]"));
    }
}
