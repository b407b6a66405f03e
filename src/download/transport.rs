//! The transfer seam between the downloader and an HTTP stack.

use std::path::Path;

use async_trait::async_trait;

use super::DownloadError;

/// Receives transport progress as a completion percentage (`0..=100`).
pub type ProgressSink<'a> = &'a mut (dyn FnMut(u8) + Send);

/// A single-URL transfer backend.
///
/// Implementations perform exactly one request per call and never retry; the
/// case-folding fallback lives above this trait. Dropping the transport releases
/// its connections.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Streams `url` into `target`, creating or truncating it.
    ///
    /// `progress` may be called any number of times with a percentage, in the
    /// order the transfer advances.
    async fn download_file(
        &self,
        url: &str,
        target: &Path,
        progress: ProgressSink<'_>,
    ) -> Result<(), DownloadError>;

    /// Fetches the whole body of `url` into memory.
    async fn download_bytes(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}
