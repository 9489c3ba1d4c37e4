//! Artifact download with streaming writes and integrity verification.
//!
//! The fetcher streams the response body to disk chunk by chunk so large
//! videos never sit in memory, verifies the byte count against the
//! declared content length, and retries transient failures with doubling
//! backoff. A short read is [`FetchError::Incomplete`], distinct from a
//! network error.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::backoff::Backoff;

const USER_AGENT: &str = "AI-Booth/1.0";

#[derive(Debug, Error)]
pub enum FetchError {
    /// Fewer (or more) bytes arrived than the response declared.
    #[error("incomplete download: {written}/{expected} bytes")]
    Incomplete { written: u64, expected: u64 },

    /// The server answered with a non-success status.
    #[error("download failed with status {status}")]
    Status { status: u16 },

    /// Connection, timeout or mid-stream transfer failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Local filesystem failure while writing the artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Transient failures and short reads are retried; HTTP error statuses
    /// and local disk errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::Incomplete { .. })
    }
}

/// Downloads a remote artifact to a local path.
#[async_trait]
pub trait ArtifactFetch: Send + Sync {
    /// Fetch `url` into `dest`, returning the number of bytes written.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;
}

pub struct ArtifactFetcher {
    max_attempts: u32,
    backoff: Backoff,
}

impl ArtifactFetcher {
    pub fn new() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::download(),
        }
    }

    async fn fetch_once(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(300))
            .build()?;

        let mut response = client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let expected = response.content_length();
        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        verify_complete(written, expected)?;
        info!(url, written, "artifact downloaded");
        Ok(written)
    }
}

impl Default for ArtifactFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// The fetch only counts as complete when the byte count matches the
/// declared content length exactly.
fn verify_complete(written: u64, expected: Option<u64>) -> Result<(), FetchError> {
    match expected {
        Some(expected) if written != expected => Err(FetchError::Incomplete { written, expected }),
        _ => Ok(()),
    }
}

#[async_trait]
impl ArtifactFetch for ArtifactFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let mut attempt = 1u32;
        loop {
            match self.fetch_once(url, dest).await {
                Ok(written) => return Ok(written),
                Err(e) if attempt < self.max_attempts && e.is_retryable() => {
                    let delay = self.backoff.delay_for_attempt(attempt);
                    warn!(attempt, ?delay, "download failed: {e}, retrying");
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
