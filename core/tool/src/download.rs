//! Artifact retrieval.
//!
//! The [`Retriever`] trait fetches a URL into a uniquely named temporary file.
//! The returned [`NamedTempFile`] removes itself when dropped, so the caller
//! that holds it owns the cleanup on every exit path.
//!
//! Transport failures are not retried: any error ends the current install.

use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::errors::ToolError;

/// Prefix for temporary download files.
const TEMP_PREFIX: &str = "fcli-tool-download";

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// User-Agent header for HTTP requests.
const USER_AGENT: &str = concat!("fcli/", env!("CARGO_PKG_VERSION"));

/// Environment variable holding an explicit proxy URL for tool downloads.
pub const PROXY_ENV: &str = "FCLI_PROXY";

/// Minimum interval between progress log lines in milliseconds.
const PROGRESS_INTERVAL_MS: u128 = 1000;

/// Fetches remote artifacts to local temporary files.
pub trait Retriever {
    /// Downloads `url` into a fresh temporary file.
    ///
    /// # Errors
    ///
    /// Returns `RetrievalFailed` for transport errors and non-success HTTP
    /// statuses, and `InstallError` if the temporary file cannot be written.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<NamedTempFile, ToolError>>;
}

/// Transport settings for [`HttpRetriever`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieverConfig {
    /// Proxy for all requests. When `None`, system proxy settings apply.
    pub proxy: Option<String>,
    /// Overall timeout per request.
    pub timeout: Duration,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

impl RetrieverConfig {
    /// Reads the proxy from `FCLI_PROXY`; empty values are treated as unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            proxy: std::env::var(PROXY_ENV)
                .ok()
                .filter(|s| !s.trim().is_empty()),
            ..Self::default()
        }
    }
}

/// Streams artifacts over HTTP(S) with reqwest.
#[derive(Debug, Clone)]
pub struct HttpRetriever {
    client: reqwest::Client,
}

impl HttpRetriever {
    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `RetrievalFailed` if the proxy URL is invalid or the client
    /// cannot be created.
    pub fn new(config: &RetrieverConfig) -> Result<Self, ToolError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT);

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| {
                ToolError::retrieval_failed_with_source(proxy, "invalid proxy URL", e)
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| {
            ToolError::retrieval_failed_with_source("", "Failed to create HTTP client", e)
        })?;
        Ok(Self { client })
    }
}

impl Retriever for HttpRetriever {
    async fn fetch(&self, url: &str) -> Result<NamedTempFile, ToolError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            ToolError::retrieval_failed_with_source(url, format!("Failed to connect to {url}"), e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::retrieval_failed(
                url,
                format!("HTTP error {status}"),
            ));
        }

        let total_size = response.content_length().unwrap_or(0);
        let temp = new_temp_file()?;
        let std_file = temp
            .as_file()
            .try_clone()
            .map_err(|e| ToolError::io("Failed to open temporary download file", e))?;
        let mut file = tokio::fs::File::from_std(std_file);

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;
        let mut last_update = Instant::now();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                ToolError::retrieval_failed_with_source(
                    url,
                    format!("Failed to read response body from {url}"),
                    e,
                )
            })?;
            file.write_all(&chunk).await.map_err(|e| {
                ToolError::io(
                    format!("Failed to write to {}", temp.path().display()),
                    e,
                )
            })?;
            downloaded += chunk.len() as u64;

            if last_update.elapsed().as_millis() >= PROGRESS_INTERVAL_MS {
                tracing::debug!(downloaded, total = total_size, "downloading {url}");
                last_update = Instant::now();
            }
        }

        file.flush().await.map_err(|e| {
            ToolError::io(format!("Failed to flush {}", temp.path().display()), e)
        })?;
        tracing::debug!(bytes = downloaded, "downloaded {url}");

        Ok(temp)
    }
}

/// Creates an empty, uniquely named temporary file for a download.
///
/// # Errors
///
/// Returns an `InstallError` if the file cannot be created.
pub fn new_temp_file() -> Result<NamedTempFile, ToolError> {
    tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile()
        .map_err(|e| ToolError::io("Failed to create temporary download file", e))
}
