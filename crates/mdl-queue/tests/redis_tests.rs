//! Redis queue/store integration tests.
//!
//! These exercise a live broker and are ignored by default.

use mdl_models::{DownloadJob, OutputFormat, TaskId, TaskState};
use mdl_queue::{TaskQueue, TaskStore};

/// Test Redis connection and basic queue operations.
#[tokio::test]
#[ignore = "requires Redis"]
async fn redis_connection_and_queue_length() {
    dotenvy::dotenv().ok();

    let queue = TaskQueue::from_env().expect("Failed to create queue");
    queue.init().await.expect("Failed to initialize queue");

    let len = queue.len().await.expect("Failed to get queue length");
    println!("Queue length: {}", len);
}

/// Test job enqueue and dequeue cycle.
#[tokio::test]
#[ignore = "requires Redis"]
async fn job_enqueue_dequeue() {
    dotenvy::dotenv().ok();

    let queue = TaskQueue::from_env().expect("Failed to create queue");
    queue.init().await.expect("Failed to initialize queue");

    let job = DownloadJob::new("https://www.youtube.com/watch?v=test", OutputFormat::Mp3);
    let task_id = job.task_id.clone();

    let message_id = queue.enqueue(&job).await.expect("Failed to enqueue");
    println!("Enqueued task {} with message ID {}", task_id, message_id);

    let jobs = queue
        .consume("test-consumer", 1000, 1)
        .await
        .expect("Failed to consume");

    assert_eq!(jobs.len(), 1);
    let (message_id, consumed) = &jobs[0];
    assert_eq!(consumed.task_id, task_id);
    assert_eq!(consumed.format, OutputFormat::Mp3);

    queue.ack(message_id).await.expect("Failed to ack");
}

/// Test the store lifecycle: create, progress, terminal, monotonic reads.
#[tokio::test]
#[ignore = "requires Redis"]
async fn store_lifecycle_is_monotonic() {
    dotenvy::dotenv().ok();

    let store = TaskStore::from_env().expect("Failed to create store");
    let task_id = TaskId::new();

    store.create(&task_id).await.expect("create");
    let record = store.get(&task_id).await.expect("get").expect("record");
    assert_eq!(record.state, TaskState::Pending);

    store
        .set_progress(&task_id, "downloading")
        .await
        .expect("set_progress");
    let record = store.get(&task_id).await.expect("get").expect("record");
    assert_eq!(record.state, TaskState::progress("downloading"));

    store
        .set_success(&task_id, "abc.mp3")
        .await
        .expect("set_success");

    // A late progress write from a redelivered message must not revert
    // the terminal state.
    store
        .set_progress(&task_id, "downloading")
        .await
        .expect("set_progress after terminal");
    let record = store.get(&task_id).await.expect("get").expect("record");
    assert_eq!(record.state, TaskState::success("abc.mp3"));
}

/// Unknown handles read as `None`, never as an error.
#[tokio::test]
#[ignore = "requires Redis"]
async fn unknown_handle_reads_as_none() {
    dotenvy::dotenv().ok();

    let store = TaskStore::from_env().expect("Failed to create store");
    let missing = store
        .get(&TaskId::from_string("never-submitted"))
        .await
        .expect("get");
    assert!(missing.is_none());
}
