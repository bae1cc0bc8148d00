//! Media fetching and artifact management.
//!
//! This crate wraps the external fetch/transcode engine (yt-dlp) and owns
//! everything filesystem-side of it: artifact discovery after a download
//! settles, partial-file filtering, and the stale-artifact sweep.

pub mod artifact;
pub mod download;
pub mod error;

pub use artifact::{locate_artifact, sweep_stale};
pub use download::{fetch_media, FetchOptions};
pub use error::{MediaError, MediaResult};
