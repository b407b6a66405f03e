//! Error types for the download module.
//!
//! Transfer failures are not distinguished by the fallback policy, but they keep
//! their URL and cause so the final error is useful in logs and to callers.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during a download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while writing the target file.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// The background task running the transfer panicked or was cancelled.
    #[error("background transfer for {url} did not complete: {message}")]
    Background {
        /// The URL the background task was fetching.
        url: String,
        /// Panic payload or cancellation reason.
        message: String,
    },

    /// Any other transport failure, mainly from caller-supplied transports.
    #[error("transfer of {url} failed: {message}")]
    Transfer {
        /// The URL that failed.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// Both the original URL and its lower-cased form failed.
    ///
    /// `source` is the error from the lower-cased attempt; the first attempt's
    /// error is only logged.
    #[error("download of {url} failed, lower-cased fallback {fallback_url} also failed: {source}")]
    FallbackExhausted {
        /// The URL originally requested.
        url: String,
        /// The lower-cased URL used for the second attempt.
        fallback_url: String,
        /// The second attempt's error.
        #[source]
        source: Box<DownloadError>,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a network or timeout error depending on the reqwest error kind.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::timeout(url)
        } else {
            Self::network(url, source)
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an error for a background task that panicked or was cancelled.
    pub fn background(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Background {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a generic transfer failure.
    pub fn transfer(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transfer {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Wraps the lower-cased attempt's error once both attempts have failed.
    pub fn fallback_exhausted(
        url: impl Into<String>,
        fallback_url: impl Into<String>,
        source: DownloadError,
    ) -> Self {
        Self::FallbackExhausted {
            url: url.into(),
            fallback_url: fallback_url.into(),
            source: Box::new(source),
        }
    }

    /// Returns the error of the last attempt that actually ran.
    ///
    /// For [`FallbackExhausted`](Self::FallbackExhausted) this is the lower-cased
    /// attempt's error; every other variant is returned as-is.
    #[must_use]
    pub fn final_error(&self) -> &DownloadError {
        match self {
            Self::FallbackExhausted { source, .. } => source.final_error(),
            other => other,
        }
    }

    /// Returns the HTTP status of the last attempt, if it failed with one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self.final_error() {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// No From<reqwest::Error> / From<std::io::Error>: every variant needs the URL or
// path that the source error does not carry, so callers use the constructors.
