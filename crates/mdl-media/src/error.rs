//! Error types for media operations.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while driving the fetch/transcode engine.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("yt-dlp not found in PATH")]
    YtDlpNotFound,

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("No artifact found for prefix {prefix} after {attempts} attempts")]
    ArtifactNotFound { prefix: String, attempts: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Whether this is the expected "engine succeeded but left no usable
    /// file" outcome, as opposed to an engine fault.
    pub fn is_artifact_not_found(&self) -> bool {
        matches!(self, MediaError::ArtifactNotFound { .. })
    }
}
