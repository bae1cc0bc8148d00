//! Task identifiers and the queue job spec.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a download task.
///
/// This is the handle returned to the client at submission time and used
/// to poll `/status/{task_id}`. It is distinct from the artifact prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generate a new random task ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Requested output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Audio-only: best audio track, extracted to mp3.
    Mp3,
    /// Video: best mp4 video + m4a audio, falling back to best available.
    Mp4,
}

impl OutputFormat {
    /// The extension the executor is expected to produce.
    ///
    /// The executor may legitimately settle on a different container; this
    /// is only the preferred candidate during artifact discovery.
    pub fn expected_ext(&self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Mp4 => "mp4",
        }
    }

    /// Whether this format requires an audio-extraction transcode step.
    pub fn is_audio(&self) -> bool {
        matches!(self, OutputFormat::Mp3)
    }

    pub fn as_str(&self) -> &'static str {
        self.expected_ext()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unsupported format string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported format: {0:?} (expected mp3 or mp4)")]
pub struct UnsupportedFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnsupportedFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(OutputFormat::Mp3),
            "mp4" => Ok(OutputFormat::Mp4),
            other => Err(UnsupportedFormat(other.to_string())),
        }
    }
}

/// Immutable job spec created at submission time and carried on the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadJob {
    /// Unique task ID (the client-facing handle)
    pub task_id: TaskId,
    /// Media URL to fetch
    pub source_url: String,
    /// Requested output format
    pub format: OutputFormat,
    /// Collision-resistant token used as the stem of the produced filename.
    /// Never reused across submissions.
    pub artifact_prefix: String,
    /// When the job was created
    pub created_at: DateTime<Utc>,
}

impl DownloadJob {
    /// Create a new job with fresh task ID and artifact prefix.
    pub fn new(source_url: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            task_id: TaskId::new(),
            source_url: source_url.into(),
            format,
            artifact_prefix: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn output_format_parses_known_values() {
        assert_eq!("mp3".parse::<OutputFormat>(), Ok(OutputFormat::Mp3));
        assert_eq!("MP4".parse::<OutputFormat>(), Ok(OutputFormat::Mp4));
        assert_eq!(" mp3 ".parse::<OutputFormat>(), Ok(OutputFormat::Mp3));
        assert!("wav".parse::<OutputFormat>().is_err());
        assert!("".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn output_format_expected_extension() {
        assert_eq!(OutputFormat::Mp3.expected_ext(), "mp3");
        assert_eq!(OutputFormat::Mp4.expected_ext(), "mp4");
        assert!(OutputFormat::Mp3.is_audio());
        assert!(!OutputFormat::Mp4.is_audio());
    }

    #[test]
    fn download_job_serde_roundtrip() {
        let job = DownloadJob::new("https://example.com/video", OutputFormat::Mp4);
        let json = serde_json::to_string(&job).expect("serialize DownloadJob");
        let decoded: DownloadJob = serde_json::from_str(&json).expect("deserialize DownloadJob");

        assert_eq!(decoded.task_id, job.task_id);
        assert_eq!(decoded.source_url, job.source_url);
        assert_eq!(decoded.format, job.format);
        assert_eq!(decoded.artifact_prefix, job.artifact_prefix);
    }

    #[test]
    fn artifact_prefixes_do_not_collide() {
        let prefixes: HashSet<String> = (0..10_000)
            .map(|_| DownloadJob::new("https://example.com/v", OutputFormat::Mp3).artifact_prefix)
            .collect();
        assert_eq!(prefixes.len(), 10_000);
    }

    #[test]
    fn task_ids_are_distinct_from_artifact_prefixes() {
        let job = DownloadJob::new("https://example.com/v", OutputFormat::Mp3);
        assert_ne!(job.task_id.as_str(), job.artifact_prefix);
    }
}
