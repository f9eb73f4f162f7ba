//! Error types for clipping operations
//!
//! Low-level platform failures are mapped into [`ClipError`] at the point where
//! they happen, so callers only ever see one of a small set of user-facing kinds.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Result type alias for clipping operations
pub type ClipResult<T> = Result<T, ClipError>;

/// Coarse error classification shown to the extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    PermissionDenied,
    NotConfigured,
    NotFound,
    QuotaExceeded,
    Locked,
    Network,
    InvalidInput,
    Unknown,
}

/// Error types for folder, file and capture operations
#[derive(Debug, Error)]
pub enum ClipError {
    /// Folder or file access was refused
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// No target folder has been chosen yet
    #[error("No target folder configured, choose one in the settings")]
    NotConfigured,

    /// File or folder vanished
    #[error("Not found: {0}")]
    NotFound(String),

    /// Disk is full or the write exceeds a size limit
    #[error("Not enough disk space: {0}")]
    QuotaExceeded(String),

    /// File is in use or read-only
    #[error("File is in use or read-only: {0}")]
    Locked(String),

    /// Timeout, DNS or HTTP failure
    #[error("Network error: {0}")]
    Network(String),

    /// Bad URL, illegal file name, stale request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Anything else
    #[error("{0}")]
    Unknown(String),
}

impl From<anyhow::Error> for ClipError {
    fn from(error: anyhow::Error) -> Self {
        ClipError::Unknown(error.to_string())
    }
}

impl From<serde_json::Error> for ClipError {
    fn from(error: serde_json::Error) -> Self {
        ClipError::InvalidInput(format!("malformed JSON: {error}"))
    }
}

impl ClipError {
    /// Map an I/O error to a clip error, prefixing the message with `context`
    #[must_use]
    pub fn from_io(error: io::Error, context: &str) -> Self {
        let message = format!("{context}: {error}");
        match error.kind() {
            io::ErrorKind::PermissionDenied => ClipError::PermissionDenied(message),
            io::ErrorKind::NotFound => ClipError::NotFound(message),
            io::ErrorKind::StorageFull | io::ErrorKind::FileTooLarge => ClipError::QuotaExceeded(message),
            io::ErrorKind::ReadOnlyFilesystem
            | io::ErrorKind::ResourceBusy
            | io::ErrorKind::ExecutableFileBusy
            | io::ErrorKind::Deadlock => ClipError::Locked(message),
            io::ErrorKind::InvalidInput
            | io::ErrorKind::NotADirectory
            | io::ErrorKind::IsADirectory => ClipError::InvalidInput(message),
            _ => ClipError::Unknown(message),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClipError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            ClipError::NotConfigured => ErrorKind::NotConfigured,
            ClipError::NotFound(_) => ErrorKind::NotFound,
            ClipError::QuotaExceeded(_) => ErrorKind::QuotaExceeded,
            ClipError::Locked(_) => ErrorKind::Locked,
            ClipError::Network(_) => ErrorKind::Network,
            ClipError::InvalidInput(_) => ErrorKind::InvalidInput,
            ClipError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Whether the user should be sent to the settings surface to fix this
    #[must_use]
    pub fn needs_settings(&self) -> bool {
        matches!(
            self,
            ClipError::NotConfigured | ClipError::PermissionDenied(_)
        )
    }
}
