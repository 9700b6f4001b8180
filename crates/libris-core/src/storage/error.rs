//! Persistence error handling
//!
//! Typed errors for reading and writing the library file, with descriptive
//! messages and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving the library file
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to create data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Library file exists but cannot be parsed or breaks record invariants
    #[error("Invalid library file '{path}': {details}")]
    InvalidFormat { path: PathBuf, details: String },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl PersistenceError {
    /// Create an error from a failed write, classified by its kind
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => PersistenceError::PermissionDenied {
                path,
                source: error,
            },
            // StorageFull is not stable on every toolchain, so fall back to the message
            _ if is_disk_full_error(&error) => PersistenceError::DiskFull {
                path,
                source: error,
            },
            _ => PersistenceError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Create an error from a failed read
    pub fn from_read(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => PersistenceError::PermissionDenied {
                path,
                source: error,
            },
            _ => PersistenceError::ReadError {
                path,
                source: error,
            },
        }
    }

    /// Check if the user can fix this without losing data
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PersistenceError::DiskFull { .. }
                | PersistenceError::PermissionDenied { .. }
                | PersistenceError::InvalidFormat { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            PersistenceError::DiskFull { .. } => Some("Free up disk space and try again."),
            PersistenceError::PermissionDenied { .. } => {
                Some("Check file and directory permissions for the library file and its directory.")
            }
            PersistenceError::InvalidFormat { .. } => {
                Some("The unreadable file was moved aside. Fix or merge it by hand, or keep the fresh library.")
            }
            PersistenceError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;
