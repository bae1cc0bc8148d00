//! Shared data models for the mediadl backend.
//!
//! This crate defines the task identifier, the queue job spec, and the
//! task-state variants shared between the API server and the worker.

pub mod task;
pub mod task_status;

pub use task::{DownloadJob, OutputFormat, TaskId};
pub use task_status::{FailureKind, TaskRecord, TaskState};
