//! Redis-backed work queue and task state store.
//!
//! This crate provides:
//! - Job enqueueing via Redis Streams with consumer-group delivery
//! - Worker consumption with retry counters and a dead-letter stream
//! - The task state store polled by the status endpoint (TTL-bounded)

pub mod error;
pub mod queue;
pub mod store;

pub use error::{QueueError, QueueResult};
pub use queue::{QueueConfig, TaskQueue};
pub use store::{StoreConfig, TaskStore, TASK_STATUS_TTL_SECS};
