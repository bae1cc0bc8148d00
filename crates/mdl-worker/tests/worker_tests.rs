//! Worker integration tests.

use std::sync::Arc;
use std::time::Duration;

use mdl_models::{DownloadJob, OutputFormat, TaskState};
use mdl_queue::TaskStore;
use mdl_worker::{process_download, NoopNotifier, Notifier, ProcessingContext, WorkerConfig};

#[tokio::test]
async fn noop_notifier_accepts_all_events() {
    let notifier = NoopNotifier;
    let job = DownloadJob::new("https://example.com/v", OutputFormat::Mp3);

    notifier.task_started(&job).await.unwrap();
    notifier
        .task_finished(&job, &TaskState::success("a.mp3"))
        .await
        .unwrap();
    notifier
        .task_finished(&job, &TaskState::failure("boom", None))
        .await
        .unwrap();
}

/// Full pipeline against a live broker and installed engine.
///
/// Exercises the failure path: an unsupported URL fails fast and the
/// record lands in FAILURE without an artifact.
#[tokio::test]
#[ignore = "requires Redis and yt-dlp"]
async fn failed_download_records_terminal_failure() {
    dotenvy::dotenv().ok();

    let dir = tempfile::tempdir().unwrap();
    let config = WorkerConfig {
        download_dir: dir.path().to_path_buf(),
        artifact_poll_attempts: 1,
        artifact_poll_delay: Duration::from_millis(10),
        cookies_file: None,
        ..WorkerConfig::default()
    };

    let store = TaskStore::from_env().unwrap();
    let ctx = ProcessingContext::new(config, store, Arc::new(NoopNotifier));

    let job = DownloadJob::new("not-a-real-url", OutputFormat::Mp4);
    ctx.store.create(&job.task_id).await.unwrap();

    let result = process_download(&ctx, &job).await;
    assert!(result.is_err());

    let record = ctx.store.get(&job.task_id).await.unwrap().unwrap();
    assert_eq!(record.state.as_str(), "FAILURE");

    // Redelivery of a finished task is a no-op.
    let result = process_download(&ctx, &job).await;
    assert!(result.is_ok());
    let record = ctx.store.get(&job.task_id).await.unwrap().unwrap();
    assert_eq!(record.state.as_str(), "FAILURE");
}
