//! Download task processing.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{info, warn};

use mdl_media::{fetch_media, locate_artifact, FetchOptions};
use mdl_models::{DownloadJob, FailureKind, TaskState};
use mdl_queue::TaskStore;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::notify::Notifier;

/// Shared context for task processing.
pub struct ProcessingContext {
    pub config: WorkerConfig,
    pub store: Arc<TaskStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl ProcessingContext {
    pub fn new(config: WorkerConfig, store: TaskStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            store: Arc::new(store),
            notifier,
        }
    }
}

/// Process a single download task end to end.
///
/// The task's record moves `downloading` -> (`transcoding`) ->
/// `locating artifact` -> terminal. Delivery is at-least-once, so a
/// redelivered task whose record is already terminal is acked without
/// re-running the engine.
pub async fn process_download(ctx: &ProcessingContext, job: &DownloadJob) -> WorkerResult<()> {
    if let Some(record) = ctx.store.get(&job.task_id).await? {
        if record.is_terminal() {
            info!(
                "Task {} already {}, skipping redelivery",
                job.task_id,
                record.state.as_str()
            );
            return Ok(());
        }
    }

    if let Err(e) = ctx.notifier.task_started(job).await {
        warn!("Start notification for {} failed: {}", job.task_id, e);
    }

    ctx.store.set_progress(&job.task_id, "downloading").await?;

    let template = ctx
        .config
        .download_dir
        .join(format!("{}.%(ext)s", job.artifact_prefix));
    let opts = FetchOptions {
        cookies_file: ctx.config.cookies_file.clone(),
        username: ctx.config.username.clone(),
        password: ctx.config.password.clone(),
    };

    let start = Instant::now();
    if let Err(e) = fetch_media(
        &job.source_url,
        job.format,
        &template.to_string_lossy(),
        &opts,
    )
    .await
    {
        let reason = e.to_string();
        return fail_task(ctx, job, reason, FailureKind::Executor).await;
    }
    histogram!("mediadl_download_duration_seconds").record(start.elapsed().as_secs_f64());

    // The engine performs audio extraction as part of the same invocation;
    // the stage is recorded so pollers see the lifecycle the client expects.
    if job.format.is_audio() {
        ctx.store.set_progress(&job.task_id, "transcoding").await?;
    }

    ctx.store
        .set_progress(&job.task_id, "locating artifact")
        .await?;

    let artifact = locate_artifact(
        &ctx.config.download_dir,
        &job.artifact_prefix,
        job.format.expected_ext(),
        ctx.config.artifact_poll_attempts,
        ctx.config.artifact_poll_delay,
    )
    .await;

    match artifact {
        Ok(path) => {
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .ok_or_else(|| WorkerError::task_failed("Artifact path has no filename"))?;

            ctx.store.set_success(&job.task_id, &filename).await?;
            counter!("mediadl_tasks_completed_total").increment(1);

            let state = TaskState::success(filename.clone());
            if let Err(e) = ctx.notifier.task_finished(job, &state).await {
                warn!("Finish notification for {} failed: {}", job.task_id, e);
            }

            info!("Task {} produced artifact {}", job.task_id, filename);
            Ok(())
        }
        Err(e) => {
            let reason = e.to_string();
            fail_task(ctx, job, reason, FailureKind::ArtifactNotFound).await
        }
    }
}

/// Record a terminal failure and report it.
async fn fail_task(
    ctx: &ProcessingContext,
    job: &DownloadJob,
    reason: String,
    kind: FailureKind,
) -> WorkerResult<()> {
    ctx.store
        .set_failure(&job.task_id, &reason, Some(kind))
        .await?;
    counter!("mediadl_tasks_failed_total").increment(1);

    let state = TaskState::failure(reason.clone(), Some(kind));
    if let Err(e) = ctx.notifier.task_finished(job, &state).await {
        warn!("Failure notification for {} failed: {}", job.task_id, e);
    }

    Err(WorkerError::DownloadFailed(reason))
}
