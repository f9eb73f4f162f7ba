//! Per-image failure reasons
//!
//! These never leave the image pipeline: each one is rendered into the
//! `error` field of an [`ImageSaveResult`](super::ImageSaveResult).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageDownloadError {
    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),

    #[error("Image not found (404)")]
    NotFound,

    #[error("Access denied (403)")]
    Forbidden,

    #[error("Server error ({0})")]
    ServerError(u16),

    #[error("HTTP error {0}")]
    HttpStatus(u16),

    #[error("Download timed out ({0}s)")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Image too large: {:.2}MB (max {}MB)", *size as f64 / 1024.0 / 1024.0, limit / 1024 / 1024)]
    SizeExceeded { size: u64, limit: usize },

    #[error("Image is empty")]
    Empty,

    #[error("Could not read image data: {0}")]
    Read(String),
}

impl ImageDownloadError {
    /// Classify a non-success HTTP status
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => ImageDownloadError::NotFound,
            403 => ImageDownloadError::Forbidden,
            500..=599 => ImageDownloadError::ServerError(status),
            other => ImageDownloadError::HttpStatus(other),
        }
    }
}
