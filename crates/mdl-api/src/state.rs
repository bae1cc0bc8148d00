//! Application state.

use std::sync::Arc;

use mdl_queue::{TaskQueue, TaskStore};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<TaskStore>,
    pub queue: Arc<TaskQueue>,
}

impl AppState {
    /// Create new application state.
    ///
    /// Ensures the consumer group exists so submissions enqueued before any
    /// worker starts are not lost.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = TaskStore::from_env()?;
        let queue = TaskQueue::from_env()?;
        queue.init().await?;

        Ok(Self {
            config,
            store: Arc::new(store),
            queue: Arc::new(queue),
        })
    }
}
