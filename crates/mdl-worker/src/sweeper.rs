//! Stale artifact retention sweeper.

use std::path::PathBuf;
use std::time::Duration;

use metrics::counter;
use tracing::{info, warn};

use mdl_media::sweep_stale;

/// Periodically deletes artifacts older than the retention window.
///
/// Expired artifacts linger only until the next sweep; a download link can
/// therefore outlive its file by at most one sweep interval, and the file
/// endpoint answers 404 for the gap.
pub struct RetentionSweeper {
    dir: PathBuf,
    max_age: Duration,
    interval: Duration,
}

impl RetentionSweeper {
    pub fn new(dir: PathBuf, max_age: Duration, interval: Duration) -> Self {
        Self {
            dir,
            max_age,
            interval,
        }
    }

    /// Run the sweep loop; never returns.
    pub async fn run(self) {
        info!(
            "Retention sweeper running on {} (max age {}s, every {}s)",
            self.dir.display(),
            self.max_age.as_secs(),
            self.interval.as_secs()
        );

        let mut interval = tokio::time::interval(self.interval);
        loop {
            interval.tick().await;

            match sweep_stale(&self.dir, self.max_age).await {
                Ok(0) => {}
                Ok(removed) => {
                    info!("Sweep removed {} stale artifacts", removed);
                    counter!("mediadl_artifacts_swept_total").increment(removed as u64);
                }
                Err(e) => {
                    warn!("Sweep of {} failed: {}", self.dir.display(), e);
                }
            }
        }
    }
}
