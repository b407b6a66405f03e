//! The public downloader: file and memory downloads with case-folding fallback.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinError;
use tracing::{debug, instrument};

use super::client::HttpTransport;
use super::config::DownloadConfig;
use super::error::DownloadError;
use super::fallback::{TransferKind, with_case_fallback};
use super::progress::ThrottledProgress;
use super::transport::Transport;

/// Download operations an update pipeline depends on.
///
/// Object-safe so orchestration code can hold a `dyn FileDownloader` and swap
/// in a fake in its own tests.
#[async_trait]
pub trait FileDownloader: Send + Sync {
    /// Downloads `url` to `target`, reporting throttled progress.
    async fn download_file(
        &self,
        url: &str,
        target: &Path,
        on_progress: Box<dyn FnMut(u8) + Send>,
    ) -> Result<(), DownloadError>;

    /// Downloads `url` into memory.
    async fn download_url(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}

#[derive(Clone)]
enum TransportSource {
    /// Caller-owned transport, reused across calls.
    Shared(Arc<dyn Transport>),
    /// A fresh [`HttpTransport`] is built for every call and dropped with it.
    PerCall(DownloadConfig),
}

/// Single-file downloader with a one-shot lower-cased URL fallback.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use update_downloader::Downloader;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let downloader = Downloader::new();
/// downloader
///     .download_to_file(
///         "https://updates.example.com/App-1.2.0-full.nupkg",
///         Path::new("./App-1.2.0-full.nupkg"),
///         |percent| println!("{percent}%"),
///     )
///     .await?;
/// let releases = downloader
///     .download_to_memory("https://updates.example.com/RELEASES")
///     .await?;
/// println!("{} bytes", releases.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Downloader {
    source: TransportSource,
    progress_interval: Duration,
}

impl fmt::Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            TransportSource::Shared(_) => "shared",
            TransportSource::PerCall(_) => "per-call",
        };
        f.debug_struct("Downloader")
            .field("transport", &source)
            .field("progress_interval", &self.progress_interval)
            .finish()
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

impl Downloader {
    /// Creates a downloader that builds a default HTTP transport per call.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DownloadConfig::default())
    }

    /// Creates a downloader that builds an HTTP transport from `config` per call.
    #[must_use]
    pub fn with_config(config: DownloadConfig) -> Self {
        let progress_interval = config.progress_interval();
        Self {
            source: TransportSource::PerCall(config),
            progress_interval,
        }
    }

    /// Creates a downloader over a caller-owned transport.
    ///
    /// The caller controls the transport's lifetime; the downloader only holds
    /// a reference count while a call is running.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            source: TransportSource::Shared(transport),
            progress_interval: DownloadConfig::default().progress_interval(),
        }
    }

    /// Overrides the minimum spacing between forwarded progress callbacks.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    fn acquire_transport(&self) -> Result<Arc<dyn Transport>, DownloadError> {
        match &self.source {
            TransportSource::Shared(transport) => Ok(Arc::clone(transport)),
            TransportSource::PerCall(config) => Ok(Arc::new(HttpTransport::with_config(config)?)),
        }
    }

    /// Downloads `url` to `target`.
    ///
    /// Transport progress is forwarded to `on_progress` at most once per
    /// progress interval (500ms by default). If the first attempt fails,
    /// `on_progress(0)` is called once and the lower-cased URL is tried. No
    /// final `100` is guaranteed. The parent directory of `target` must exist.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::FallbackExhausted`] if both attempts fail, or
    /// [`DownloadError::ClientBuild`] if the per-call transport cannot be built.
    /// After an error the contents of `target` are unspecified.
    #[instrument(skip(self, on_progress), fields(url = %url, target = %target.display()))]
    pub async fn download_to_file<P>(
        &self,
        url: &str,
        target: &Path,
        on_progress: P,
    ) -> Result<(), DownloadError>
    where
        P: FnMut(u8) + Send,
    {
        let transport = self.acquire_transport()?;
        let progress = Arc::new(Mutex::new(ThrottledProgress::new(
            self.progress_interval,
            on_progress,
        )));
        let restart = Arc::clone(&progress);

        with_case_fallback(
            url,
            TransferKind::File,
            |attempt_url| {
                let transport = Arc::clone(&transport);
                let progress = Arc::clone(&progress);
                async move {
                    let mut sink = |percent: u8| lock(&progress).report(percent);
                    transport
                        .download_file(&attempt_url, target, &mut sink)
                        .await
                }
            },
            move || lock(&restart).restart(),
        )
        .await?;

        debug!("file download complete");
        Ok(())
    }

    /// Downloads `url` into memory.
    ///
    /// Each attempt runs on Tokio's blocking pool so that blocking DNS
    /// resolution never stalls the calling thread; the caller only awaits the
    /// attempt's completion. Errors and panics in the attempt are returned
    /// here. Dropping the returned future cancels the running attempt.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::FallbackExhausted`] if both attempts fail, or
    /// [`DownloadError::ClientBuild`] if the per-call transport cannot be built.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn download_to_memory(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let transport = self.acquire_transport()?;

        let bytes = with_case_fallback(
            url,
            TransferKind::Memory,
            |attempt_url| fetch_in_background(Arc::clone(&transport), attempt_url),
            || {},
        )
        .await?;

        debug!(bytes = bytes.len(), "memory download complete");
        Ok(bytes)
    }
}

#[async_trait]
impl FileDownloader for Downloader {
    async fn download_file(
        &self,
        url: &str,
        target: &Path,
        on_progress: Box<dyn FnMut(u8) + Send>,
    ) -> Result<(), DownloadError> {
        self.download_to_file(url, target, on_progress).await
    }

    async fn download_url(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        self.download_to_memory(url).await
    }
}

/// Runs one memory transfer on Tokio's blocking pool and re-raises its outcome.
///
/// The transfer future is driven by `Handle::block_on` on a pool thread, so a
/// transport that blocks (synchronous DNS, a stalled resolver) never occupies
/// the caller's thread, even on a current-thread runtime. Dropping the returned
/// future drops `_cancel`, which ends the transfer and releases `transport`.
async fn fetch_in_background(
    transport: Arc<dyn Transport>,
    url: String,
) -> Result<Vec<u8>, DownloadError> {
    let runtime = Handle::current();
    let (_cancel, cancelled) = oneshot::channel::<()>();
    let task_url = url.clone();
    let handle = tokio::task::spawn_blocking(move || {
        runtime.block_on(async move {
            tokio::select! {
                result = transport.download_bytes(&task_url) => Some(result),
                _ = cancelled => None,
            }
        })
    });

    match handle.await {
        Ok(Some(result)) => result,
        Ok(None) => Err(DownloadError::background(url, "transfer cancelled")),
        Err(join_error) => Err(DownloadError::background(url, describe_join_error(join_error))),
    }
}

fn describe_join_error(join_error: JoinError) -> String {
    if !join_error.is_panic() {
        return join_error.to_string();
    }
    let payload = join_error.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .map_or_else(
            || "task panicked".to_string(),
            |message| format!("task panicked: {message}"),
        )
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
