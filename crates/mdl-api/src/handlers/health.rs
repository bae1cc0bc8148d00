//! Health check handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::metrics;
use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub redis: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl CheckStatus {
    fn ok(latency_ms: u64) -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
            latency_ms: Some(latency_ms),
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
            latency_ms: None,
        }
    }
}

/// Health check endpoint.
///
/// Always answers 200: the endpoint doubles as the keep-alive target for
/// uptime pingers, and a degraded broker is reported in the body rather
/// than by failing the probe.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    use std::time::Instant;

    // Check Redis (via queue length) and refresh the queue gauges while
    // we are here
    let redis_check = {
        let start = Instant::now();
        match state.queue.len().await {
            Ok(len) => {
                metrics::set_queue_length(len);
                if let Ok(dlq_len) = state.queue.dlq_len().await {
                    metrics::set_dlq_length(dlq_len);
                }
                CheckStatus::ok(start.elapsed().as_millis() as u64)
            }
            Err(e) => CheckStatus::error(e.to_string()),
        }
    };

    Json(HealthResponse {
        status: if redis_check.status == "ok" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        redis: redis_check,
    })
}
