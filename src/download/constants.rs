//! Constants for the download module (timeouts, progress throttling).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Minimum spacing between forwarded progress callbacks (500 milliseconds).
pub const PROGRESS_INTERVAL_MS: u64 = 500;

/// [`PROGRESS_INTERVAL_MS`] as a `Duration`.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(PROGRESS_INTERVAL_MS);
