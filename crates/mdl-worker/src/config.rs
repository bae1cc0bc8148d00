//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum concurrent download tasks
    pub max_concurrent_jobs: usize,
    /// Directory where finished artifacts are written
    pub download_dir: PathBuf,
    /// Graceful shutdown timeout
    pub shutdown_timeout: Duration,
    /// How often the worker should scan for orphaned pending tasks
    pub claim_interval: Duration,
    /// Minimum idle time before a pending task can be claimed (crash recovery)
    pub claim_min_idle: Duration,
    /// Artifact discovery: number of scans before giving up
    pub artifact_poll_attempts: u32,
    /// Artifact discovery: delay between scans
    pub artifact_poll_delay: Duration,
    /// Artifacts older than this are deleted by the sweeper
    pub retention_max_age: Duration,
    /// How often the sweeper runs
    pub sweep_interval: Duration,
    /// Optional Netscape cookie jar for authenticated downloads
    pub cookies_file: Option<PathBuf>,
    /// Optional username passed through to the engine
    pub username: Option<String>,
    /// Optional password passed through to the engine
    pub password: Option<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 2,
            download_dir: PathBuf::from("/downloads"),
            shutdown_timeout: Duration::from_secs(30),
            claim_interval: Duration::from_secs(30),
            claim_min_idle: Duration::from_secs(300), // 5 minutes
            artifact_poll_attempts: 10,
            artifact_poll_delay: Duration::from_millis(500),
            retention_max_age: Duration::from_secs(3600), // 1 hour
            sweep_interval: Duration::from_secs(300),
            cookies_file: Some(PathBuf::from("/etc/secrets/cookies.txt")),
            username: None,
            password: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_concurrent_jobs: std::env::var("WORKER_MAX_JOBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            download_dir: std::env::var("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/downloads")),
            shutdown_timeout: Duration::from_secs(
                std::env::var("WORKER_SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            claim_interval: Duration::from_secs(
                std::env::var("WORKER_CLAIM_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            claim_min_idle: Duration::from_secs(
                std::env::var("WORKER_CLAIM_MIN_IDLE_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
            artifact_poll_attempts: std::env::var("ARTIFACT_POLL_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            artifact_poll_delay: Duration::from_millis(
                std::env::var("ARTIFACT_POLL_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(500),
            ),
            retention_max_age: Duration::from_secs(
                std::env::var("RETENTION_MAX_AGE_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
            sweep_interval: Duration::from_secs(
                std::env::var("SWEEP_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
            cookies_file: std::env::var("COOKIES_FILE")
                .map(|s| Some(PathBuf::from(s)))
                .unwrap_or_else(|_| Some(PathBuf::from("/etc/secrets/cookies.txt"))),
            username: std::env::var("YTDLP_USERNAME").ok().filter(|s| !s.is_empty()),
            password: std::env::var("YTDLP_PASSWORD").ok().filter(|s| !s.is_empty()),
        }
    }
}
