//! Error types for Bookden
//!
//! A single error enum covers the whole failure taxonomy of the add-book
//! workflow and the record store. Errors carry a severity so the shell can
//! decide how loudly to report them:
//! - **Recoverable**: transient, retrying the operation is reasonable
//! - **Degraded**: the operation failed cleanly, library state is intact
//! - **Fatal**: library and store disagree, user intervention required

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Transient failure, safe to retry
    Recoverable,
    /// Operation failed but no state was damaged
    Degraded,
    /// Library/store inconsistency requiring manual fix
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Main error type for Bookden
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad input rejected before any side effect
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Source file does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Target file already exists; nothing was moved or overwritten
    #[error("Target already exists: {path}")]
    Conflict { path: PathBuf },

    /// I/O failure during file placement; the source file is intact
    #[error("Filesystem error: {message}")]
    Filesystem {
        message: String,
        #[source]
        source: io::Error,
    },

    /// Persistence-layer failure
    #[error("Store error: {message}")]
    Store {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Record lookup miss
    #[error("Record not found: {entity} with {identifier}")]
    RecordNotFound { entity: String, identifier: String },

    /// Record commit failed AND reverting the file placement failed too.
    /// The placed file at `path` has no matching record.
    #[error(
        "Library inconsistent: record commit failed ({store_error}) and reverting the file \
         placement at {path} also failed ({rollback_error}); manual intervention required"
    )]
    RollbackFailure {
        path: PathBuf,
        store_error: String,
        rollback_error: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {setting} = '{value}' ({reason})")]
    InvalidConfiguration {
        setting: String,
        value: String,
        reason: String,
    },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Transient persistence failures are worth retrying
            Self::Store { .. } => ErrorSeverity::Recoverable,

            // Clean failures with no state damage
            Self::Validation { .. }
            | Self::FileNotFound { .. }
            | Self::Conflict { .. }
            | Self::Filesystem { .. }
            | Self::RecordNotFound { .. }
            | Self::InvalidConfiguration { .. } => ErrorSeverity::Degraded,

            // The one case where library and store disagree
            Self::RollbackFailure { .. } => ErrorSeverity::Fatal,

            Self::Internal { .. } => ErrorSeverity::Degraded,
        }
    }

    /// Returns true if this error should be flagged distinctly in the UI
    pub fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }

    /// Returns a user-friendly message suitable for display in the shell
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } => message.clone(),
            Self::FileNotFound { path } => {
                format!("The file '{}' was not found.", path.display())
            }
            Self::Conflict { path } => format!(
                "'{}' already exists. Rename the book or choose a different title.",
                path.display()
            ),
            Self::Filesystem { .. } => {
                "A file operation failed. Your original file was not touched.".to_string()
            }
            Self::Store { .. } => {
                "The library database is temporarily unavailable. Please try again.".to_string()
            }
            Self::RecordNotFound { .. } => "The requested book was not found.".to_string(),
            Self::RollbackFailure { path, .. } => format!(
                "The library is in an inconsistent state: '{}' was placed but could not be \
                 recorded or removed. Please remove or re-add it manually.",
                path.display()
            ),
            Self::InvalidConfiguration { setting, .. } => {
                format!("Invalid setting: {}. Please check your configuration.", setting)
            }
            Self::Internal { .. } => "An unexpected error occurred. Please try again.".to_string(),
        }
    }

    /// Helper to create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Helper to create a conflict error
    pub fn conflict(path: impl Into<PathBuf>) -> Self {
        Self::Conflict { path: path.into() }
    }

    /// Helper to create a filesystem error from an I/O error
    pub fn filesystem(message: impl Into<String>, source: io::Error) -> Self {
        Self::Filesystem {
            message: message.into(),
            source,
        }
    }

    /// Helper to create a store error from any error type
    pub fn store<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Store {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper to create a record-not-found error
    pub fn not_found(entity: impl Into<String>, identifier: impl fmt::Display) -> Self {
        Self::RecordNotFound {
            entity: entity.into(),
            identifier: identifier.to_string(),
        }
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound {
                path: PathBuf::from("unknown"),
            },
            _ => Self::Filesystem {
                message: err.to_string(),
                source: err,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Recoverable < ErrorSeverity::Degraded);
        assert!(ErrorSeverity::Degraded < ErrorSeverity::Fatal);
    }

    #[test]
    fn test_validation_is_degraded() {
        let err = AppError::validation("author is required");
        assert_eq!(err.severity(), ErrorSeverity::Degraded);
        assert!(!err.is_critical());
        assert_eq!(err.user_message(), "author is required");
    }

    #[test]
    fn test_conflict_carries_path() {
        let err = AppError::conflict("/library/AAVV/Anthology - AA.VV..epub");
        assert_eq!(err.severity(), ErrorSeverity::Degraded);
        let display = format!("{}", err);
        assert!(display.contains("Anthology"));
    }

    #[test]
    fn test_store_is_recoverable() {
        let inner = io::Error::new(io::ErrorKind::Other, "disk full");
        let err = AppError::store("insert failed", inner);
        assert_eq!(err.severity(), ErrorSeverity::Recoverable);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_rollback_failure_is_fatal() {
        let err = AppError::RollbackFailure {
            path: PathBuf::from("/library/X/book.pdf"),
            store_error: "disk full".to_string(),
            rollback_error: "permission denied".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert!(err.is_critical());

        let display = format!("{}", err);
        assert!(display.contains("disk full"));
        assert!(display.contains("permission denied"));
        assert!(display.contains("manual intervention"));
    }

    #[test]
    fn test_user_messages_hide_internals() {
        let inner = io::Error::new(io::ErrorKind::Other, "SQLITE_IOERR");
        let err = AppError::store("insert failed", inner);
        let msg = err.user_message();
        assert!(!msg.contains("SQLITE"));
        assert!(msg.contains("database"));
    }

    #[test]
    fn test_from_io_error_not_found() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: AppError = io_err.into();
        assert!(matches!(err, AppError::FileNotFound { .. }));
    }

    #[test]
    fn test_from_io_error_other() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = io_err.into();
        assert!(matches!(err, AppError::Filesystem { .. }));
    }

    #[test]
    fn test_filesystem_source_chain() {
        let inner = io::Error::new(io::ErrorKind::Other, "inner");
        let err = AppError::filesystem("copy failed", inner);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_result_type_alias() {
        fn ok() -> Result<u32> {
            Ok(7)
        }
        assert_eq!(ok().unwrap(), 7);
    }
}
