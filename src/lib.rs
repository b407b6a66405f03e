//! Update Downloader Library
//!
//! A single-file HTTP downloader used as a building block in update and
//! installer pipelines. It fetches one resource to disk or into memory, retries
//! once with the lower-cased URL when the server has mangled the path's case,
//! throttles progress callbacks, and keeps transfers off the caller's task.
//!
//! # Architecture
//!
//! - [`download`] - Downloader, fallback executor, progress throttle, HTTP transport
//!
//! The library emits `tracing` events but never installs a subscriber.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use download::{
    DownloadConfig, DownloadError, Downloader, FileDownloader, HttpTransport, Transport,
};
