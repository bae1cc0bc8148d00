//! Media download worker.
//!
//! This crate provides:
//! - Task executor consuming the download queue
//! - yt-dlp invocation and artifact discovery
//! - Best-effort lifecycle notifications
//! - Stale artifact retention sweeping
//! - Graceful shutdown

pub mod config;
pub mod error;
pub mod executor;
pub mod notify;
pub mod processor;
pub mod sweeper;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::TaskExecutor;
pub use notify::{NoopNotifier, Notifier, TelegramNotifier};
pub use processor::{process_download, ProcessingContext};
pub use sweeper::RetentionSweeper;
