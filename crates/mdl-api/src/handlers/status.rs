//! Task status polling handler.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::error;

use mdl_models::{TaskId, TaskRecord, TaskState};

use crate::config::ApiConfig;
use crate::state::AppState;

/// Polled status payload.
///
/// The `state` field is always present; the optional fields appear only in
/// the states that carry them.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Download link for a finished artifact, absolute when a public base URL
/// is configured.
fn download_url(config: &ApiConfig, artifact_filename: &str) -> String {
    match &config.public_base_url {
        Some(base) => format!("{}/file/{}", base, artifact_filename),
        None => format!("/file/{}", artifact_filename),
    }
}

/// Map a store lookup result onto the polled payload.
///
/// Unknown or expired handles are a normal outcome of the retention policy,
/// not an error, so they answer 200 with a distinct state.
pub fn status_payload(
    record: Option<TaskRecord>,
    config: &ApiConfig,
) -> (StatusCode, StatusResponse) {
    let record = match record {
        Some(r) => r,
        None => {
            return (
                StatusCode::OK,
                StatusResponse {
                    state: "UNKNOWN".to_string(),
                    status: Some("Task not found or expired".to_string()),
                    download_url: None,
                    error: None,
                },
            )
        }
    };

    let response = match record.state {
        TaskState::Pending => StatusResponse {
            state: "PENDING".to_string(),
            status: Some("Task is waiting for a worker".to_string()),
            download_url: None,
            error: None,
        },
        TaskState::Progress { stage } => StatusResponse {
            state: "PROGRESS".to_string(),
            status: Some(stage),
            download_url: None,
            error: None,
        },
        TaskState::Success { artifact_filename } => StatusResponse {
            state: "SUCCESS".to_string(),
            status: Some("Download complete".to_string()),
            download_url: Some(download_url(config, &artifact_filename)),
            error: None,
        },
        TaskState::Failure { reason, .. } => StatusResponse {
            state: "FAILURE".to_string(),
            status: None,
            download_url: None,
            error: Some(reason),
        },
    };

    (StatusCode::OK, response)
}

/// Poll the status of a submitted task.
///
/// This handler never surfaces a store fault as a bare 500 page: pollers
/// run on a timer and expect a JSON body every time.
pub async fn get_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> (StatusCode, Json<StatusResponse>) {
    let task_id = TaskId::from_string(task_id);

    match state.store.get(&task_id).await {
        Ok(record) => {
            let (status, payload) = status_payload(record, &state.config);
            (status, Json(payload))
        }
        Err(e) => {
            error!("Status lookup failed for {}: {}", task_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusResponse {
                    state: "ERROR".to_string(),
                    status: None,
                    download_url: None,
                    error: Some("Status lookup failed".to_string()),
                }),
            )
        }
    }
}
