//! Error types for state snapshot handling.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for state file and backend operations.
pub type Result<T> = std::result::Result<T, StateError>;

/// Opaque failure reported by a state manager.
///
/// The protocol never inspects or rewraps these; callers that need the
/// concrete type can downcast.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the bundle codec and the shipped backends.
#[derive(Error, Debug)]
pub enum StateError {
    // File Errors
    #[error("Failed to read state file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write state file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory creation failed: {path}: {source}")]
    DirectoryCreateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Format Errors
    #[error("Invalid state file: {reason}")]
    InvalidStateFile { reason: String },

    #[error("Unsupported state file format version {version} (newest supported is {supported})")]
    UnsupportedFormatVersion { version: u64, supported: u64 },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StateError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            StateError::FileReadError { .. } => "FILE_READ_ERROR",
            StateError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            StateError::DirectoryCreateError { .. } => "DIRECTORY_CREATE_ERROR",
            StateError::InvalidStateFile { .. } => "INVALID_STATE_FILE",
            StateError::UnsupportedFormatVersion { .. } => "UNSUPPORTED_FORMAT_VERSION",
            StateError::Json(_) => "JSON_ERROR",
            StateError::Io(_) => "IO_ERROR",
        }
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StateError::UnsupportedFormatVersion { .. } => {
                Some("The state file was written by a newer release. Upgrade before reading it.")
            }
            StateError::InvalidStateFile { .. } | StateError::Json(_) => {
                Some("The state file is damaged. Restore it from its backup copy.")
            }
            StateError::FileWriteError { .. } | StateError::DirectoryCreateError { .. } => {
                Some("Check permissions and free space at the state location.")
            }
            _ => None,
        }
    }
}

/// Errors returned by [`import`](crate::state::migrate::import).
///
/// Only the three conflict variants originate here. Everything the target
/// backend reports is carried in [`ImportError::Backend`] unchanged.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("cannot import state with lineage {imported:?} over unrelated state with lineage {current:?}")]
    LineageConflict { imported: String, current: String },

    #[error("cannot overwrite existing state with serial {serial} (lineage {lineage:?}) with a different state that has the same serial")]
    SameSerialConflict { lineage: String, serial: u64 },

    #[error("cannot import state with serial {imported} over newer state with serial {current}")]
    StaleSerial { imported: u64, current: u64 },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ImportError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ImportError::LineageConflict { .. } => "LINEAGE_CONFLICT",
            ImportError::SameSerialConflict { .. } => "SAME_SERIAL_CONFLICT",
            ImportError::StaleSerial { .. } => "STALE_SERIAL",
            ImportError::Backend(_) => "BACKEND_ERROR",
        }
    }

    /// Returns true if the import was refused by a consistency check.
    pub fn is_conflict(&self) -> bool {
        !matches!(self, ImportError::Backend(_))
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            ImportError::LineageConflict { .. } => {
                Some("The snapshot belongs to an unrelated history. Use --force only if replacing it is intended.")
            }
            ImportError::SameSerialConflict { .. } => {
                Some("Two different snapshots share a serial. Pull the current state and compare before forcing.")
            }
            ImportError::StaleSerial { .. } => {
                Some("The stored state is newer. Pull it first, or use --force to overwrite it.")
            }
            ImportError::Backend(_) => None,
        }
    }

    /// Unwrap the backend's own error, if that is what this is.
    pub fn into_backend(self) -> Option<BackendError> {
        match self {
            ImportError::Backend(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = StateError::UnsupportedFormatVersion {
            version: 9,
            supported: 1,
        };
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT_VERSION");
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_conflict_messages_carry_metadata() {
        let err = ImportError::LineageConflict {
            imported: "y".to_string(),
            current: "x".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"y\""));
        assert!(msg.contains("\"x\""));
        assert!(err.is_conflict());

        let err = ImportError::StaleSerial {
            imported: 2,
            current: 7,
        };
        assert!(err.to_string().contains("serial 2"));
        assert!(err.to_string().contains("serial 7"));
    }

    #[test]
    fn test_backend_error_is_transparent() {
        let inner: BackendError = Box::new(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only backend",
        ));
        let err = ImportError::from(inner);
        assert_eq!(err.to_string(), "read-only backend");
        assert!(!err.is_conflict());
        assert!(err.recovery_suggestion().is_none());

        let inner = err.into_backend().unwrap();
        let io = inner.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::PermissionDenied);
    }
}
