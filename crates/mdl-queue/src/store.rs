//! Task state store backed by Redis keys with a fixed TTL.
//!
//! The store is the single shared mutable resource between the API and the
//! worker pool: the worker that claimed a task is the only writer for that
//! handle, the status endpoint only reads. Entries expire a fixed time
//! after creation; an expired or never-created handle reads as `None`.

use redis::AsyncCommands;
use tracing::debug;

use mdl_models::{FailureKind, TaskId, TaskRecord, TaskState};

use crate::error::QueueResult;

/// How long a task record stays retrievable after creation (24 hours).
pub const TASK_STATUS_TTL_SECS: u64 = 86_400;

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Redis URL
    pub redis_url: String,
    /// TTL applied when a record is created
    pub status_ttl_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            status_ttl_secs: TASK_STATUS_TTL_SECS,
        }
    }
}

impl StoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            status_ttl_secs: std::env::var("STATUS_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(TASK_STATUS_TTL_SECS),
        }
    }
}

/// Task state store client.
pub struct TaskStore {
    client: redis::Client,
    config: StoreConfig,
}

impl TaskStore {
    /// Create a new task store.
    pub fn new(config: StoreConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        Self::new(StoreConfig::from_env())
    }

    fn status_key(task_id: &TaskId) -> String {
        format!("mdl:status:{}", task_id)
    }

    /// Create a fresh `PENDING` record for a handle.
    ///
    /// The TTL starts here; later updates keep the original expiry so the
    /// retention window is measured from creation.
    pub async fn create(&self, task_id: &TaskId) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let record = TaskRecord::new(task_id.clone());
        let payload = serde_json::to_string(&record)?;

        conn.set_ex::<_, _, ()>(
            Self::status_key(task_id),
            payload,
            self.config.status_ttl_secs,
        )
        .await?;

        debug!("Created task record {}", task_id);
        Ok(())
    }

    /// Record a progress stage.
    pub async fn set_progress(&self, task_id: &TaskId, stage: &str) -> QueueResult<()> {
        self.transition(task_id, TaskState::progress(stage)).await
    }

    /// Record terminal success with the produced artifact filename.
    pub async fn set_success(&self, task_id: &TaskId, artifact_filename: &str) -> QueueResult<()> {
        self.transition(task_id, TaskState::success(artifact_filename))
            .await
    }

    /// Record terminal failure with a reason and optional kind tag.
    pub async fn set_failure(
        &self,
        task_id: &TaskId,
        reason: &str,
        kind: Option<FailureKind>,
    ) -> QueueResult<()> {
        self.transition(task_id, TaskState::failure(reason, kind))
            .await
    }

    /// Look up the record for a handle.
    ///
    /// Returns `Ok(None)` for handles that were never created or have
    /// expired; the caller maps that to an "unknown" status, not an error.
    pub async fn get(&self, task_id: &TaskId) -> QueueResult<Option<TaskRecord>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let raw: Option<String> = conn.get(Self::status_key(task_id)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Apply a transition with last-write-wins semantics.
    ///
    /// If the stored record is already terminal the write is skipped: the
    /// owning worker is the single writer, but redelivered queue entries
    /// must not revert a finished task.
    async fn transition(&self, task_id: &TaskId, next: TaskState) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = Self::status_key(task_id);
        let raw: Option<String> = conn.get(&key).await?;

        let mut record = match raw {
            Some(json) => serde_json::from_str(&json)?,
            // Record expired mid-flight; re-create so the transition is
            // still observable for the remainder of a fresh TTL.
            None => TaskRecord::new(task_id.clone()),
        };

        if !record.transition(next) {
            debug!("Skipping transition for terminal task {}", task_id);
            return Ok(());
        }

        let payload = serde_json::to_string(&record)?;

        // KEEPTTL preserves the expiry set at creation.
        let written: bool = redis::cmd("SET")
            .arg(&key)
            .arg(&payload)
            .arg("XX")
            .arg("KEEPTTL")
            .query_async::<Option<String>>(&mut conn)
            .await?
            .is_some();

        if !written {
            // Key no longer exists (expired between read and write); start
            // a fresh TTL so the terminal state remains pollable.
            conn.set_ex::<_, _, ()>(&key, payload, self.config.status_ttl_secs)
                .await?;
        }

        debug!("Task {} -> {}", task_id, record.state);
        Ok(())
    }
}
