//! Task executor.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use mdl_models::DownloadJob;
use mdl_queue::TaskQueue;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::processor::{process_download, ProcessingContext};

/// Task executor that processes download tasks from the queue.
pub struct TaskExecutor {
    config: WorkerConfig,
    queue: Arc<TaskQueue>,
    ctx: Arc<ProcessingContext>,
    job_semaphore: Arc<Semaphore>,
    shutdown: tokio::sync::watch::Sender<bool>,
    consumer_name: String,
}

impl TaskExecutor {
    /// Create a new task executor.
    pub fn new(config: WorkerConfig, queue: TaskQueue, ctx: ProcessingContext) -> Self {
        let job_semaphore = Arc::new(Semaphore::new(config.max_concurrent_jobs));
        let (shutdown, _) = tokio::sync::watch::channel(false);
        let consumer_name = format!("worker-{}", Uuid::new_v4());

        Self {
            config,
            queue: Arc::new(queue),
            ctx: Arc::new(ctx),
            job_semaphore,
            shutdown,
            consumer_name,
        }
    }

    /// Start the executor.
    pub async fn run(&self) -> WorkerResult<()> {
        info!(
            "Starting task executor '{}' with {} max concurrent tasks",
            self.consumer_name, self.config.max_concurrent_jobs
        );

        // Initialize queue
        self.queue.init().await?;

        let mut shutdown_rx = self.shutdown.subscribe();

        // Spawn a task to claim orphaned pending entries periodically
        let queue_clone = Arc::clone(&self.queue);
        let consumer_name = self.consumer_name.clone();
        let ctx_clone = Arc::clone(&self.ctx);
        let semaphore_clone = Arc::clone(&self.job_semaphore);
        let claim_interval = self.config.claim_interval;
        let claim_min_idle_ms = self.config.claim_min_idle.as_millis() as u64;
        let mut shutdown_rx_claim = self.shutdown.subscribe();

        let claim_task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(claim_interval);
            loop {
                tokio::select! {
                    _ = shutdown_rx_claim.changed() => {
                        if *shutdown_rx_claim.borrow() {
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        match queue_clone.claim_pending(&consumer_name, claim_min_idle_ms, 5).await {
                            Ok(jobs) if !jobs.is_empty() => {
                                info!("Claimed {} pending tasks", jobs.len());
                                for (message_id, job) in jobs {
                                    let ctx = Arc::clone(&ctx_clone);
                                    let queue = Arc::clone(&queue_clone);
                                    let permit = match semaphore_clone.clone().acquire_owned().await {
                                        Ok(p) => p,
                                        Err(_) => break,
                                    };

                                    tokio::spawn(async move {
                                        let _permit = permit;
                                        Self::execute_task(ctx, queue, message_id, job).await;
                                    });
                                }
                            }
                            Ok(_) => {}
                            Err(e) => {
                                warn!("Failed to claim pending tasks: {}", e);
                            }
                        }
                    }
                }
            }
        });

        // Main task consumption loop
        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping executor");
                        break;
                    }
                }
                result = self.consume_tasks() => {
                    if let Err(e) = result {
                        error!("Error consuming tasks: {}", e);
                        // Back off on error
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                }
            }
        }

        claim_task.abort();

        // Wait for in-flight tasks to complete
        info!("Waiting for in-flight tasks to complete...");
        let _ = tokio::time::timeout(self.config.shutdown_timeout, self.wait_for_tasks()).await;

        info!("Task executor stopped");
        Ok(())
    }

    /// Consume and process tasks from the queue.
    async fn consume_tasks(&self) -> WorkerResult<()> {
        // Acquire semaphore permit before consuming
        let available = self.job_semaphore.available_permits();
        if available == 0 {
            // All slots busy, wait a bit
            tokio::time::sleep(Duration::from_millis(100)).await;
            return Ok(());
        }

        let jobs = self
            .queue
            .consume(
                &self.consumer_name,
                1000, // Block for 1 second
                available.min(5),
            )
            .await?;

        if jobs.is_empty() {
            return Ok(());
        }

        debug!("Consumed {} tasks from queue", jobs.len());

        for (message_id, job) in jobs {
            let ctx = Arc::clone(&self.ctx);
            let queue = Arc::clone(&self.queue);
            let permit = self
                .job_semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| WorkerError::task_failed("Semaphore closed"))?;

            tokio::spawn(async move {
                let _permit = permit;
                Self::execute_task(ctx, queue, message_id, job).await;
            });
        }

        Ok(())
    }

    /// Execute a single task with retry and DLQ handling.
    async fn execute_task(
        ctx: Arc<ProcessingContext>,
        queue: Arc<TaskQueue>,
        message_id: String,
        job: DownloadJob,
    ) {
        let task_id = job.task_id.clone();
        info!("Executing task {}", task_id);

        match process_download(&ctx, &job).await {
            Ok(()) => {
                info!("Task {} completed", task_id);
                if let Err(e) = queue.ack(&message_id).await {
                    error!("Failed to ack task {}: {}", task_id, e);
                }
            }
            Err(e) => {
                error!("Task {} failed: {}", task_id, e);

                // Permanent failures go straight to the DLQ; redelivery
                // cannot change the outcome.
                if e.is_permanent_failure() {
                    if let Err(dlq_err) = queue.dlq(&message_id, &job, &e.to_string()).await {
                        error!("Failed to move task {} to DLQ: {}", task_id, dlq_err);
                    }
                    return;
                }

                let retry_count = queue.increment_retry(&message_id).await.unwrap_or(999);
                let max_retries = queue.max_retries();

                if retry_count >= max_retries {
                    warn!(
                        "Task {} exceeded max retries ({}), moving to DLQ",
                        task_id, max_retries
                    );
                    if let Err(dlq_err) = queue.dlq(&message_id, &job, &e.to_string()).await {
                        error!("Failed to move task {} to DLQ: {}", task_id, dlq_err);
                    }
                } else {
                    info!(
                        "Task {} left pending for reclaim (attempt {}/{})",
                        task_id, retry_count, max_retries
                    );
                }
            }
        }
    }

    /// Wait for all in-flight tasks to complete.
    async fn wait_for_tasks(&self) {
        loop {
            let available = self.job_semaphore.available_permits();
            if available == self.config.max_concurrent_jobs {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Signal shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}
