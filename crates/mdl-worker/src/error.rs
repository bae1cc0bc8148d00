//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Task failed: {0}")]
    TaskFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Media error: {0}")]
    Media(#[from] mdl_media::MediaError),

    #[error("Queue error: {0}")]
    Queue(#[from] mdl_queue::QueueError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn task_failed(msg: impl Into<String>) -> Self {
        Self::TaskFailed(msg.into())
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    /// Check if this is a permanent failure that should NOT be retried.
    ///
    /// These are errors where retrying won't help, the media itself is
    /// inaccessible (age-restricted, private, removed, geo-blocked).
    /// Redelivering the task only burns retries and delays the failure
    /// the user needs to see.
    pub fn is_permanent_failure(&self) -> bool {
        let msg = self.to_string().to_lowercase();

        // Age restriction (requires login/cookies we don't have)
        if msg.contains("age") && (msg.contains("restrict") || msg.contains("verif")) {
            return true;
        }

        // Private videos
        if msg.contains("private video") || msg.contains("video is private") {
            return true;
        }

        // Unavailable videos
        if msg.contains("video unavailable")
            || msg.contains("video is unavailable")
            || msg.contains("video not available")
        {
            return true;
        }

        // Deleted videos
        if msg.contains("video has been removed") || msg.contains("video was deleted") {
            return true;
        }

        // Copyright blocked
        if msg.contains("copyright") && msg.contains("block") {
            return true;
        }

        // Region blocked
        if msg.contains("not available in your country") || msg.contains("blocked in your country")
        {
            return true;
        }

        // Unsupported or malformed URLs
        if msg.contains("unsupported url") || msg.contains("is not a valid url") {
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_failures_are_detected() {
        assert!(WorkerError::download_failed("ERROR: Private video").is_permanent_failure());
        assert!(WorkerError::download_failed("Video unavailable").is_permanent_failure());
        assert!(
            WorkerError::download_failed("Sign in to confirm your age. Age-restricted content")
                .is_permanent_failure()
        );
        assert!(WorkerError::download_failed("Unsupported URL: ftp://x").is_permanent_failure());
    }

    #[test]
    fn transient_failures_are_retryable() {
        assert!(!WorkerError::download_failed("HTTP Error 503").is_permanent_failure());
        assert!(!WorkerError::download_failed("Connection reset by peer").is_permanent_failure());
    }
}
