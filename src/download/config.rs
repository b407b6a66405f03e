//! Downloader configuration.
//!
//! [`DownloadConfig`] is `serde`-deserializable so a host application can embed it
//! in its own configuration file; every field has a default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants::{CONNECT_TIMEOUT_SECS, PROGRESS_INTERVAL_MS, READ_TIMEOUT_SECS};

/// Settings for building the HTTP transport and throttling progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds.
    pub read_timeout_secs: u64,
    /// User-Agent override; the crate default is used when `None`.
    pub user_agent: Option<String>,
    /// Minimum spacing between forwarded progress callbacks, in milliseconds.
    pub progress_interval_ms: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
            user_agent: None,
            progress_interval_ms: PROGRESS_INTERVAL_MS,
        }
    }
}

impl DownloadConfig {
    /// Returns a config with explicit timeout values and defaults elsewhere.
    #[must_use]
    pub fn with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        Self {
            connect_timeout_secs,
            read_timeout_secs,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    #[must_use]
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}
