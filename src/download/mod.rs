//! Single-file HTTP downloads with a case-folding fallback.
//!
//! This module fetches one remote resource either to disk or into memory. Some
//! hosts serve paths case-sensitively while corrupting the case of uploaded file
//! names, so a failed transfer is retried exactly once against the lower-cased
//! URL before the error is returned.
//!
//! # Features
//!
//! - Streaming file downloads with progress throttled to one callback per 500ms
//! - In-memory downloads run on a background task, off the caller's task
//! - Exactly one fallback attempt per request, on any failure
//! - Pluggable [`Transport`] (the default is [`HttpTransport`] over `reqwest`)
//! - Structured error types with full context
//!
//! # Example
//!
//! ```no_run
//! use update_downloader::download::Downloader;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = Downloader::new();
//! let bytes = downloader
//!     .download_to_memory("https://updates.example.com/RELEASES")
//!     .await?;
//! println!("fetched {} bytes", bytes.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
pub mod constants;
mod downloader;
mod error;
mod fallback;
mod progress;
mod transport;

pub use client::HttpTransport;
pub use config::DownloadConfig;
pub use downloader::{Downloader, FileDownloader};
pub use error::DownloadError;
pub use fallback::{AttemptState, TransferKind, lowercase_url, with_case_fallback};
pub use progress::{ProgressThrottle, ThrottledProgress};
pub use transport::{ProgressSink, Transport};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
