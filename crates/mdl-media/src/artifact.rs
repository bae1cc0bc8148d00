//! Artifact discovery and retention.
//!
//! The engine may settle on a different container than requested, and its
//! final rename can land slightly after the process exits. Discovery
//! therefore polls a bounded number of times, preferring the expected
//! extension and falling back to any non-partial file with the prefix.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};

/// Suffixes left behind by in-flight or aborted engine runs.
const PARTIAL_SUFFIXES: &[&str] = &["part", "ytdl", "tmp", "temp", "download", "frag"];

/// Check whether a path looks like a partial/temporary engine file.
fn is_partial(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => PARTIAL_SUFFIXES
            .iter()
            .any(|s| ext.eq_ignore_ascii_case(s)),
        // Extensionless files are never produced by a completed run.
        None => true,
    }
}

/// Single scan of `dir` for a canonical artifact.
///
/// Prefers `{prefix}.{expected_ext}`; otherwise returns the first
/// non-partial `{prefix}.*` candidate.
async fn find_candidate(
    dir: &Path,
    prefix: &str,
    expected_ext: &str,
) -> MediaResult<Option<PathBuf>> {
    let preferred = dir.join(format!("{}.{}", prefix, expected_ext));
    if tokio::fs::try_exists(&preferred).await? {
        return Ok(Some(preferred));
    }

    let stem = format!("{}.", prefix);
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => continue,
        };
        if name.starts_with(&stem) && !is_partial(&path) {
            return Ok(Some(path));
        }
    }

    Ok(None)
}

/// Locate the canonical artifact for a prefix, polling until filesystem
/// writes settle.
///
/// Returns `MediaError::ArtifactNotFound` once `attempts` scans (spaced by
/// `delay`) have found nothing; the exact attempt/delay values are tuning,
/// not contract.
pub async fn locate_artifact(
    dir: &Path,
    prefix: &str,
    expected_ext: &str,
    attempts: u32,
    delay: Duration,
) -> MediaResult<PathBuf> {
    for attempt in 1..=attempts {
        if let Some(path) = find_candidate(dir, prefix, expected_ext).await? {
            debug!(
                "Located artifact {} on attempt {}",
                path.display(),
                attempt
            );
            return Ok(path);
        }
        if attempt < attempts {
            sleep(delay).await;
        }
    }

    Err(MediaError::ArtifactNotFound {
        prefix: prefix.to_string(),
        attempts,
    })
}

/// Delete regular files in `dir` older than `max_age`.
///
/// Per-file failures are logged and skipped; the sweep itself only fails
/// when the directory cannot be read at all. Returns the number of files
/// removed.
pub async fn sweep_stale(dir: &Path, max_age: Duration) -> std::io::Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();

        let metadata = match entry.metadata().await {
            Ok(m) if m.is_file() => m,
            Ok(_) => continue,
            Err(e) => {
                warn!("Skipping {} during sweep: {}", path.display(), e);
                continue;
            }
        };

        // Creation time is not available on every filesystem; fall back to
        // the modification time.
        let born = metadata
            .created()
            .or_else(|_| metadata.modified())
            .unwrap_or(now);

        let age = now.duration_since(born).unwrap_or(Duration::ZERO);
        if age <= max_age {
            continue;
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Swept stale artifact {}", path.display());
                removed += 1;
            }
            Err(e) => {
                warn!("Failed to sweep {}: {}", path.display(), e);
            }
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        tokio::fs::write(&path, b"data").await.unwrap();
        path
    }

    #[tokio::test]
    async fn prefers_expected_extension() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "abc.webm").await;
        let expected = touch(dir.path(), "abc.mp4").await;

        let found = locate_artifact(dir.path(), "abc", "mp4", 1, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(found, expected);
    }

    #[tokio::test]
    async fn falls_back_to_other_extension() {
        let dir = TempDir::new().unwrap();
        let webm = touch(dir.path(), "abc.webm").await;

        let found = locate_artifact(dir.path(), "abc", "mp4", 1, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(found, webm);
    }

    #[tokio::test]
    async fn skips_partial_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "abc.mp4.part").await;
        touch(dir.path(), "abc.ytdl").await;
        touch(dir.path(), "abc.temp").await;

        let err = locate_artifact(dir.path(), "abc", "mp4", 2, Duration::ZERO)
            .await
            .unwrap_err();
        assert!(err.is_artifact_not_found());
    }

    #[tokio::test]
    async fn ignores_other_prefixes() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "other.mp4").await;

        let err = locate_artifact(dir.path(), "abc", "mp4", 1, Duration::ZERO)
            .await
            .unwrap_err();
        assert!(err.is_artifact_not_found());
    }

    #[tokio::test]
    async fn sweep_removes_aged_files_and_keeps_fresh_ones() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "old.mp3").await;
        touch(dir.path(), "new.mp4").await;

        // A generous threshold retains everything just written.
        let removed = sweep_stale(dir.path(), Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(removed, 0);

        // A zero threshold ages everything out.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let removed = sweep_stale(dir.path(), Duration::ZERO).await.unwrap();
        assert_eq!(removed, 2);
        assert!(!dir.path().join("old.mp3").exists());
        assert!(!dir.path().join("new.mp4").exists());
    }

    #[tokio::test]
    async fn sweep_ignores_directories() {
        let dir = TempDir::new().unwrap();
        tokio::fs::create_dir(dir.path().join("subdir"))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        let removed = sweep_stale(dir.path(), Duration::ZERO).await.unwrap();
        assert_eq!(removed, 0);
        assert!(dir.path().join("subdir").exists());
    }
}
