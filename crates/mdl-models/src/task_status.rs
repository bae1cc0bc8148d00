//! Task state for progress tracking and polling.
//!
//! The state is stored in Redis as a tagged variant so the status endpoint
//! never has to guess which keys are present in a loose map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::TaskId;

/// Classification of a failure, carried alongside the human-readable reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The fetch/transcode engine reported an error.
    Executor,
    /// The engine reported success but no usable file was found.
    ArtifactNotFound,
}

/// Lifecycle state of a download task.
///
/// Transitions are strictly monotonic: once a terminal variant is recorded
/// no further transitions are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// Created atomically with enqueue; no worker has claimed it yet.
    Pending,
    /// A worker has claimed the task and is at the given stage.
    Progress { stage: String },
    /// Terminal: the named artifact was produced.
    Success { artifact_filename: String },
    /// Terminal: the task failed with the given reason.
    Failure {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        kind: Option<FailureKind>,
    },
}

impl TaskState {
    /// Wire name of the state, as seen by polling clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "PENDING",
            TaskState::Progress { .. } => "PROGRESS",
            TaskState::Success { .. } => "SUCCESS",
            TaskState::Failure { .. } => "FAILURE",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Success { .. } | TaskState::Failure { .. })
    }

    pub fn progress(stage: impl Into<String>) -> Self {
        TaskState::Progress { stage: stage.into() }
    }

    pub fn success(artifact_filename: impl Into<String>) -> Self {
        TaskState::Success {
            artifact_filename: artifact_filename.into(),
        }
    }

    pub fn failure(reason: impl Into<String>, kind: Option<FailureKind>) -> Self {
        TaskState::Failure {
            reason: reason.into(),
            kind,
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored record for a task handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// The client-facing handle
    pub task_id: TaskId,
    /// Current lifecycle state
    #[serde(flatten)]
    pub state: TaskState,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the state was last updated
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Create a fresh `PENDING` record.
    pub fn new(task_id: TaskId) -> Self {
        let now = Utc::now();
        Self {
            task_id,
            state: TaskState::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the task is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Apply a state transition.
    ///
    /// Returns `false` (and leaves the record untouched) when the record is
    /// already terminal, so redelivered work cannot revert a finished task.
    pub fn transition(&mut self, next: TaskState) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = next;
        self.updated_at = Utc::now();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_wire_names() {
        assert_eq!(TaskState::Pending.as_str(), "PENDING");
        assert_eq!(TaskState::progress("downloading").as_str(), "PROGRESS");
        assert_eq!(TaskState::success("a.mp3").as_str(), "SUCCESS");
        assert_eq!(TaskState::failure("boom", None).as_str(), "FAILURE");
    }

    #[test]
    fn terminal_states() {
        assert!(!TaskState::Pending.is_terminal());
        assert!(!TaskState::progress("transcoding").is_terminal());
        assert!(TaskState::success("a.mp4").is_terminal());
        assert!(TaskState::failure("boom", Some(FailureKind::Executor)).is_terminal());
    }

    #[test]
    fn record_transitions_are_monotonic() {
        let mut record = TaskRecord::new(TaskId::new());
        assert!(record.transition(TaskState::progress("downloading")));
        assert!(record.transition(TaskState::success("a.mp3")));

        // Terminal: further transitions are refused.
        assert!(!record.transition(TaskState::progress("downloading")));
        assert!(!record.transition(TaskState::failure("late", None)));
        assert_eq!(record.state, TaskState::success("a.mp3"));
    }

    #[test]
    fn record_serde_keeps_tagged_state() {
        let mut record = TaskRecord::new(TaskId::from_string("t-1"));
        record.transition(TaskState::failure(
            "yt-dlp failed",
            Some(FailureKind::Executor),
        ));

        let json = serde_json::to_value(&record).expect("serialize TaskRecord");
        assert_eq!(json["state"], "FAILURE");
        assert_eq!(json["reason"], "yt-dlp failed");
        assert_eq!(json["kind"], "executor");

        let decoded: TaskRecord = serde_json::from_value(json).expect("deserialize TaskRecord");
        assert!(decoded.is_terminal());
    }

    #[test]
    fn pending_record_serializes_without_extra_fields() {
        let record = TaskRecord::new(TaskId::from_string("t-2"));
        let json = serde_json::to_value(&record).expect("serialize TaskRecord");
        assert_eq!(json["state"], "PENDING");
        assert!(json.get("reason").is_none());
        assert!(json.get("artifact_filename").is_none());
    }
}
