//! Media download using yt-dlp.
//!
//! The engine is treated as a black box: given a URL, a format selector,
//! and an output template it either produces a file under the template's
//! directory or fails with a descriptive error on stderr.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

use mdl_models::OutputFormat;

use crate::error::{MediaError, MediaResult};

/// Writable temp path for cookies (yt-dlp rewrites the jar after use).
const TEMP_COOKIES_PATH: &str = "/tmp/mdl-cookies.txt";

/// Minimum size for a valid cookies file (bytes).
/// A real Netscape cookies file is at least ~50 bytes.
const MIN_COOKIES_FILE_SIZE: u64 = 50;

/// Credential material for the engine.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Path to a Netscape cookie jar (typically a read-only mounted secret)
    pub cookies_file: Option<PathBuf>,
    /// Username pass-through
    pub username: Option<String>,
    /// Password pass-through
    pub password: Option<String>,
}

/// Validate that a cookies file appears to be in Netscape format.
///
/// Netscape cookies files either start with "# Netscape HTTP Cookie File"
/// or contain tab-separated lines with domain entries.
fn is_valid_netscape_cookies(content: &str) -> bool {
    if content.starts_with("# Netscape HTTP Cookie File")
        || content.starts_with("# HTTP Cookie File")
    {
        return true;
    }

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() >= 6 {
            return true;
        }
    }

    false
}

/// Get a writable copy of the configured cookies file.
///
/// The source is typically mounted read-only, and yt-dlp tries to save
/// cookies back after use, so the jar is copied to a temp location first.
///
/// Returns `None` if the file is missing, too small, or not in valid
/// Netscape format.
async fn prepare_cookies(source: &Path) -> Option<String> {
    if !source.exists() {
        debug!("Cookies file not found at {}, skipping", source.display());
        return None;
    }

    match tokio::fs::metadata(source).await {
        Ok(metadata) if metadata.len() < MIN_COOKIES_FILE_SIZE => {
            debug!(
                "Cookies file {} is too small ({} bytes), skipping",
                source.display(),
                metadata.len()
            );
            return None;
        }
        Ok(_) => {}
        Err(e) => {
            warn!("Failed to read cookies file metadata: {}", e);
            return None;
        }
    }

    match tokio::fs::read_to_string(source).await {
        Ok(content) if !is_valid_netscape_cookies(&content) => {
            debug!(
                "Cookies file {} is not in valid Netscape format, skipping",
                source.display()
            );
            return None;
        }
        Ok(_) => {}
        Err(e) => {
            warn!("Failed to read cookies file: {}", e);
            return None;
        }
    }

    if let Err(e) = tokio::fs::copy(source, TEMP_COOKIES_PATH).await {
        warn!("Failed to copy cookies file to temp: {}", e);
        return None;
    }

    info!("Using cookies file for authenticated downloads");
    Some(TEMP_COOKIES_PATH.to_string())
}

/// Format selector passed to yt-dlp for the requested output.
fn format_selector(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Mp3 => "bestaudio/best",
        OutputFormat::Mp4 => "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
    }
}

/// Fetch media from a URL using yt-dlp.
///
/// `output_template` is a yt-dlp output template such as
/// `/downloads/<prefix>.%(ext)s`; the engine picks the final extension.
/// For audio formats the engine also extracts and transcodes to mp3.
///
/// Returns `Err(MediaError::DownloadFailed)` with the engine's last stderr
/// line when the process exits non-zero.
pub async fn fetch_media(
    url: &str,
    format: OutputFormat,
    output_template: &str,
    opts: &FetchOptions,
) -> MediaResult<()> {
    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

    info!("Fetching {} as {} to {}", url, format, output_template);

    let mut args: Vec<String> = vec![
        "--no-playlist".to_string(),
        "-f".to_string(),
        format_selector(format).to_string(),
        "-o".to_string(),
        output_template.to_string(),
    ];

    if format.is_audio() {
        args.extend(
            [
                "--extract-audio",
                "--audio-format",
                "mp3",
                "--audio-quality",
                "192K",
            ]
            .map(String::from),
        );
    }

    let cookies_path = match &opts.cookies_file {
        Some(source) => prepare_cookies(source).await,
        None => None,
    };
    if let Some(cp) = &cookies_path {
        args.push("--cookies".to_string());
        args.push(cp.clone());
    }

    if let (Some(user), Some(pass)) = (&opts.username, &opts.password) {
        args.push("--username".to_string());
        args.push(user.clone());
        args.push("--password".to_string());
        args.push(pass.clone());
    }

    args.push(url.to_string());

    let output = Command::new("yt-dlp")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("yt-dlp stderr: {}", stderr);

        let error_msg = stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("Unknown error");

        return Err(MediaError::download_failed(format!(
            "yt-dlp failed: {}",
            error_msg
        )));
    }

    info!("Fetch completed for {}", url);
    Ok(())
}
