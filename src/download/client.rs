//! `reqwest`-backed [`Transport`].
//!
//! This module provides [`HttpTransport`], which streams responses to disk with
//! percentage progress or buffers them in memory, with timeouts from
//! [`DownloadConfig`].

use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_LENGTH;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use super::config::DownloadConfig;
use super::error::DownloadError;
use super::transport::{ProgressSink, Transport};
use crate::user_agent;

/// HTTP transport over a `reqwest` client.
///
/// Cloning is cheap and shares the connection pool. The downloader builds one
/// per call unless the caller supplies its own.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes (for large files)
    /// - No transparent decompression: bodies are stored exactly as served
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if the TLS backend or system
    /// configuration cannot be initialized.
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_config(&DownloadConfig::default())
    }

    /// Creates a transport from explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if the client cannot be built.
    pub fn with_config(config: &DownloadConfig) -> Result<Self, DownloadError> {
        let client =
            build_client(config).map_err(|source| DownloadError::ClientBuild { source })?;
        Ok(Self { client })
    }

    /// Wraps an existing client, reusing its pool and settings.
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn send_get(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn download_file(
        &self,
        url: &str,
        target: &Path,
        progress: ProgressSink<'_>,
    ) -> Result<(), DownloadError> {
        let response = self.send_get(url).await?;
        let content_length = response_content_length(&response);

        let mut file = File::create(target)
            .await
            .map_err(|e| DownloadError::io(target, e))?;

        let bytes = stream_to_file(&mut file, response, url, target, content_length, progress)
            .await?;
        debug!(path = %target.display(), bytes, "response written");
        Ok(())
    }

    async fn download_bytes(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let response = self.send_get(url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| DownloadError::from_reqwest(url, e))?;
        debug!(bytes = body.len(), "response buffered");
        Ok(body.to_vec())
    }
}

/// Streams response body to file, returning bytes written.
///
/// Progress is reported after every chunk when the total size is known; the
/// caller throttles.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
    content_length: Option<u64>,
    progress: ProgressSink<'_>,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::from_reqwest(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
        if let Some(percent) = percent_complete(bytes_written, content_length) {
            progress(percent);
        }
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}

fn response_content_length(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
}

/// Percentage of `total` covered by `written`, capped at 100.
///
/// `total` is the `Content-Length` of the body as sent. Responses are never
/// decoded in transit, so it always matches the bytes written.
fn percent_complete(written: u64, total: Option<u64>) -> Option<u8> {
    let total = total.filter(|t| *t > 0)?;
    let percent = written.saturating_mul(100) / total;
    Some(u8::try_from(percent.min(100)).unwrap_or(100))
}

pub(crate) fn build_client(config: &DownloadConfig) -> Result<Client, reqwest::Error> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(user_agent::default_download_user_agent);
    Client::builder()
        .connect_timeout(config.connect_timeout())
        .timeout(config.read_timeout())
        .user_agent(user_agent)
        .build()
}
