//! Artifact file delivery handler.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Validate an artifact filename from the URL path.
///
/// Artifacts are flat files named `{uuid}.{ext}`; anything that could
/// navigate out of the download directory is rejected before the path is
/// ever joined.
pub fn is_valid_artifact_name(name: &str) -> bool {
    !name.is_empty() && !name.contains("..") && !name.contains('/') && !name.contains('\\')
}

/// Content type by artifact extension.
fn content_type_for(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    if lower.ends_with(".mp3") {
        "audio/mpeg"
    } else if lower.ends_with(".mp4") {
        "video/mp4"
    } else if lower.ends_with(".m4a") {
        "audio/mp4"
    } else if lower.ends_with(".webm") {
        "video/webm"
    } else {
        "application/octet-stream"
    }
}

/// Serve a finished artifact as an attachment.
///
/// The file is streamed rather than buffered; artifacts can be large.
/// Missing files answer a plain-text 404: swept artifacts are routine and
/// the link may be opened directly in a browser tab.
pub async fn serve_artifact(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    if !is_valid_artifact_name(&filename) {
        return Err(ApiError::bad_request("Invalid filename"));
    }

    let path = state.config.download_dir.join(&filename);

    let file = match tokio::fs::File::open(&path).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Artifact not found: {}", filename);
            return Ok((StatusCode::NOT_FOUND, "File not found").into_response());
        }
        Err(e) => return Err(ApiError::internal(format!("Failed to open artifact: {}", e))),
    };

    let metadata = file
        .metadata()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to stat artifact: {}", e)))?;

    if !metadata.is_file() {
        return Ok((StatusCode::NOT_FOUND, "File not found").into_response());
    }

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&filename).to_string()),
            (header::CONTENT_LENGTH, metadata.len().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response();

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_artifact_names() {
        assert!(is_valid_artifact_name(
            "550e8400-e29b-41d4-a716-446655440000.mp3"
        ));
        assert!(is_valid_artifact_name("clip.mp4"));
    }

    #[test]
    fn traversal_names_are_rejected() {
        assert!(!is_valid_artifact_name(""));
        assert!(!is_valid_artifact_name("../etc/passwd"));
        assert!(!is_valid_artifact_name("..\\secrets.txt"));
        assert!(!is_valid_artifact_name("a/b.mp3"));
        assert!(!is_valid_artifact_name("a\\b.mp3"));
        assert!(!is_valid_artifact_name(".."));
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for("a.mp3"), "audio/mpeg");
        assert_eq!(content_type_for("a.MP4"), "video/mp4");
        assert_eq!(content_type_for("a.m4a"), "audio/mp4");
        assert_eq!(content_type_for("a.webm"), "video/webm");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
    }
}
