//! Axum HTTP API server.
//!
//! This crate provides:
//! - Download submission returning a pollable task handle
//! - Status polling backed by the Redis task store
//! - Artifact file delivery with traversal protection
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
