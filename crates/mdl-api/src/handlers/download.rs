//! Download submission handler.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use mdl_models::{DownloadJob, OutputFormat};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Submission request body.
#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "mp4".to_string()
}

/// Submission response: the handle the client polls with.
#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub success: bool,
    pub task_id: String,
    pub status: String,
}

/// Submit a download task.
///
/// Validation happens before any state is created, so a rejected submission
/// leaves no record behind. On success the record is created first and the
/// job enqueued second; a handle that exists without a queue entry reads as
/// `PENDING` until its TTL expires, which is preferable to a queued job the
/// client can never poll.
pub async fn submit_download(
    State(state): State<AppState>,
    body: Option<Json<DownloadRequest>>,
) -> ApiResult<Json<DownloadResponse>> {
    let Json(request) = body.ok_or_else(|| ApiError::bad_request("Missing JSON body"))?;

    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApiError::bad_request("Missing required field: url"));
    }

    let format: OutputFormat = request
        .format
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid format: expected mp3 or mp4"))?;

    let job = DownloadJob::new(url, format);
    let task_id = job.task_id.clone();

    state.store.create(&task_id).await?;
    state.queue.enqueue(&job).await?;

    metrics::record_task_submitted(format.as_str());
    info!("Accepted download task {} for {}", task_id, url);

    Ok(Json(DownloadResponse {
        success: true,
        task_id: task_id.to_string(),
        status: "PENDING".to_string(),
    }))
}
