//! One-shot case-folding fallback for transfers.
//!
//! Some hosts serve paths case-sensitively but mangle the case of uploaded file
//! names. A failed transfer is therefore retried exactly once against the
//! lower-cased URL. Any failure of the first attempt triggers the retry; the
//! error kind is not inspected, so a transient network error also uses up the
//! single retry.

use std::future::Future;

use tracing::{debug, info, warn};

use super::DownloadError;

/// Which public operation an attempt belongs to; selects the log wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// Streaming to a file on disk.
    File,
    /// Fetching into memory.
    Memory,
}

/// Per-request attempt bookkeeping.
///
/// `fallback_url` is set at most once, after the first attempt fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptState {
    original_url: String,
    fallback_url: Option<String>,
}

impl AttemptState {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            original_url: url.into(),
            fallback_url: None,
        }
    }

    #[must_use]
    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    #[must_use]
    pub fn fallback_url(&self) -> Option<&str> {
        self.fallback_url.as_deref()
    }

    /// The URL the next attempt should use.
    #[must_use]
    pub fn current_url(&self) -> &str {
        self.fallback_url().unwrap_or(&self.original_url)
    }

    /// Switches to the lower-cased URL and returns it. Idempotent.
    pub fn enter_fallback(&mut self) -> &str {
        let original = &self.original_url;
        self.fallback_url
            .get_or_insert_with(|| lowercase_url(original))
    }
}

/// Lower-cases the whole URL.
///
/// Scheme and host are case-insensitive anyway, so folding the full string only
/// changes the path and query as far as the server is concerned.
#[must_use]
pub fn lowercase_url(url: &str) -> String {
    url.to_lowercase()
}

/// Runs `transfer` against `url`, then once against the lower-cased URL if the
/// first attempt fails.
///
/// `on_fallback` is called exactly once, after the first failure and before the
/// second attempt starts. Attempts never overlap. If the second attempt also
/// fails, its error is returned wrapped in
/// [`DownloadError::FallbackExhausted`].
///
/// # Errors
///
/// Returns [`DownloadError::FallbackExhausted`] when both attempts fail.
pub async fn with_case_fallback<T, F, Fut, H>(
    url: &str,
    kind: TransferKind,
    mut transfer: F,
    on_fallback: H,
) -> Result<T, DownloadError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, DownloadError>>,
    H: FnOnce(),
{
    let mut state = AttemptState::new(url);

    let first_error = match run_attempt(kind, state.current_url(), &mut transfer).await {
        Ok(value) => return Ok(value),
        Err(error) => error,
    };

    let fallback_url = state.enter_fallback().to_string();
    debug!(
        url = %url,
        fallback_url = %fallback_url,
        error = %first_error,
        "retrying with lower-cased URL"
    );
    on_fallback();

    run_attempt(kind, &fallback_url, &mut transfer)
        .await
        .map_err(|error| DownloadError::fallback_exhausted(url, fallback_url.as_str(), error))
}

async fn run_attempt<T, F, Fut>(
    kind: TransferKind,
    url: &str,
    transfer: &mut F,
) -> Result<T, DownloadError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, DownloadError>>,
{
    match kind {
        TransferKind::File => info!(url = %url, "Downloading file"),
        TransferKind::Memory => info!(url = %url, "Downloading url"),
    }

    let result = transfer(url.to_string()).await;
    if let Err(error) = &result {
        match kind {
            TransferKind::File => warn!(url = %url, error = %error, "Failed downloading URL"),
            TransferKind::Memory => warn!(url = %url, error = %error, "Failed to download url"),
        }
    }
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    type Calls = Arc<Mutex<Vec<String>>>;

    /// Transfer that succeeds only for URLs in `good`, recording every call.
    fn recording_transfer(
        calls: &Calls,
        good: &'static [&'static str],
    ) -> impl FnMut(String) -> std::future::Ready<Result<usize, DownloadError>> {
        let calls = Arc::clone(calls);
        move |url: String| {
            calls.lock().unwrap().push(url.clone());
            std::future::ready(if good.contains(&url.as_str()) {
                Ok(url.len())
            } else {
                Err(DownloadError::http_status(url, 404))
            })
        }
    }

    #[test]
    fn test_lowercase_url_folds_whole_url() {
        assert_eq!(
            lowercase_url("http://Example.com/File.BIN"),
            "http://example.com/file.bin"
        );
        assert_eq!(lowercase_url("http://host/a.bin"), "http://host/a.bin");
    }

    #[test]
    fn test_attempt_state_sets_fallback_once() {
        let mut state = AttemptState::new("http://Host/A.bin");
        assert_eq!(state.current_url(), "http://Host/A.bin");
        assert_eq!(state.fallback_url(), None);

        assert_eq!(state.enter_fallback(), "http://host/a.bin");
        assert_eq!(state.current_url(), "http://host/a.bin");
        assert_eq!(state.enter_fallback(), "http://host/a.bin");
        assert_eq!(state.original_url(), "http://Host/A.bin");
    }

    #[tokio::test]
    async fn test_first_attempt_success_makes_one_call() {
        let calls = Calls::default();
        let mut fallback_hits = 0;
        let result = with_case_fallback(
            "http://Host/A.bin",
            TransferKind::Memory,
            recording_transfer(&calls, &["http://Host/A.bin"]),
            || fallback_hits += 1,
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(*calls.lock().unwrap(), vec!["http://Host/A.bin"]);
        assert_eq!(fallback_hits, 0);
    }

    #[tokio::test]
    async fn test_fallback_success_uses_lowercased_url() {
        let calls = Calls::default();
        let mut fallback_hits = 0;
        let result = with_case_fallback(
            "http://Example.com/File.BIN",
            TransferKind::File,
            recording_transfer(&calls, &["http://example.com/file.bin"]),
            || fallback_hits += 1,
        )
        .await;

        assert!(result.is_ok(), "Expected Ok, got: {result:?}");
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["http://Example.com/File.BIN", "http://example.com/file.bin"]
        );
        assert_eq!(fallback_hits, 1);
    }

    #[tokio::test]
    async fn test_both_attempts_fail_stops_after_two() {
        let calls = Calls::default();
        let result = with_case_fallback(
            "http://Host/Missing.bin",
            TransferKind::Memory,
            recording_transfer(&calls, &[]),
            || {},
        )
        .await;

        assert_eq!(calls.lock().unwrap().len(), 2);
        match result {
            Err(DownloadError::FallbackExhausted {
                url,
                fallback_url,
                source,
            }) => {
                assert_eq!(url, "http://Host/Missing.bin");
                assert_eq!(fallback_url, "http://host/missing.bin");
                assert!(matches!(
                    *source,
                    DownloadError::HttpStatus { ref url, status: 404 } if url == "http://host/missing.bin"
                ));
            }
            other => panic!("Expected FallbackExhausted, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_already_lowercase_url_still_retries_once() {
        let calls = Calls::default();
        let result = with_case_fallback(
            "http://host/a.bin",
            TransferKind::File,
            recording_transfer(&calls, &[]),
            || {},
        )
        .await;

        assert!(result.is_err());
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["http://host/a.bin", "http://host/a.bin"]
        );
    }

    #[tokio::test]
    async fn test_any_error_kind_triggers_fallback() {
        let calls = Calls::default();
        let calls_in_transfer = Arc::clone(&calls);
        let result = with_case_fallback(
            "http://Host/A.bin",
            TransferKind::Memory,
            move |url: String| {
                let mut calls = calls_in_transfer.lock().unwrap();
                calls.push(url.clone());
                let outcome = if calls.len() == 1 {
                    Err(DownloadError::timeout(url))
                } else {
                    Ok(7)
                };
                std::future::ready(outcome)
            },
            || {},
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.lock().unwrap().len(), 2);
    }
}
