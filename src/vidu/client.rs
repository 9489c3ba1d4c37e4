//! HTTP client for the Vidu generation service.
//!
//! Implements the two halves of the remote stage: submitting an image
//! (with an explicit, inspectable retry loop) and polling the job until
//! it reaches a terminal status (with consecutive-failure tracking and a
//! wall-clock ceiling). The [`VideoGenerator`] trait is the seam the
//! pipeline orchestrator depends on.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, multipart};
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::backoff::{Backoff, POLL_INTERVAL, poll_delay};

use super::error::ViduError;
use super::types::{RemoteJobHandle, RemoteStatus, StatusResponse, SubmitResponse};

const API_BASE_URL: &str = "https://api.vidu.ai";
const USER_AGENT: &str = "AI-Booth/1.0";

/// Submits images for remote generation and polls for the result.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    /// Upload an image and obtain a handle to the remote job.
    async fn submit(&self, image: &Path) -> Result<RemoteJobHandle, ViduError>;

    /// Poll the job until it finishes, returning the artifact URL.
    async fn poll_until_complete(
        &self,
        handle: &mut RemoteJobHandle,
    ) -> Result<String, ViduError>;
}

pub struct ViduClient {
    api_key: String,
    base_url: String,
    upload_backoff: Backoff,
    upload_attempts: u32,
    poll_interval: Duration,
    poll_check_limit: u32,
    streak_limit: u32,
}

impl ViduClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, API_BASE_URL.to_string())
    }

    /// Create a client pointing at a custom base URL (useful for testing).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            upload_backoff: Backoff::upload(),
            upload_attempts: 5,
            poll_interval: POLL_INTERVAL,
            poll_check_limit: 180,
            streak_limit: 3,
        }
    }

    /// Override the steady-state poll cadence.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Preflight credential/reachability check against the jobs endpoint.
    ///
    /// Any response below 500 that is not an auth or rate-limit rejection
    /// counts as reachable.
    pub async fn check_access(&self) -> Result<(), ViduError> {
        let client = http_client(Duration::from_secs(5), Duration::from_secs(10))?;
        let response = client
            .get(format!("{}/jobs", self.base_url))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            401 => Err(ViduError::Credential),
            403 => Err(ViduError::Api {
                status: 403,
                message: "API key lacks permission".to_string(),
            }),
            429 => Err(ViduError::RateLimited),
            s if s >= 500 => Err(ViduError::Server { status: s }),
            _ => Ok(()),
        }
    }

    async fn submit_once(&self, image: &Path) -> Result<RemoteJobHandle, ViduError> {
        // Fresh client per attempt so a poisoned keep-alive connection
        // from a failed attempt is never reused.
        let client = http_client(Duration::from_secs(10), Duration::from_secs(60))?;

        let data = tokio::fs::read(image).await?;
        let file_name = image
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        let form = multipart::Form::new()
            .part("image", multipart::Part::bytes(data).file_name(file_name));

        let response = client
            .post(format!("{}/jobs", self.base_url))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ViduError::Credential);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ViduError::RateLimited);
        }
        if status.is_server_error() {
            return Err(ViduError::Server {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ViduError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: SubmitResponse =
            serde_json::from_str(&body).map_err(|e| ViduError::Protocol(e.to_string()))?;
        Ok(RemoteJobHandle::new(parsed.id))
    }

    async fn poll_once(&self, client: &Client, job_id: &str) -> Result<StatusResponse, ViduError> {
        let response = client
            .get(format!("{}/jobs/{}", self.base_url, job_id))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ViduError::NotFound(job_id.to_string()));
        }
        if status.is_server_error() {
            return Err(ViduError::Server {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ViduError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ViduError::Protocol(e.to_string()))
    }
}

#[async_trait]
impl VideoGenerator for ViduClient {
    async fn submit(&self, image: &Path) -> Result<RemoteJobHandle, ViduError> {
        let mut attempt = 1u32;
        loop {
            match self.submit_once(image).await {
                Ok(handle) => {
                    info!(job_id = %handle.id, attempt, "image submitted");
                    return Ok(handle);
                }
                Err(e) if attempt < self.upload_attempts && e.is_retryable_submit() => {
                    let delay = self.upload_backoff.delay_for_attempt(attempt);
                    warn!(attempt, ?delay, "upload failed: {e}, retrying");
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn poll_until_complete(
        &self,
        handle: &mut RemoteJobHandle,
    ) -> Result<String, ViduError> {
        // One session for the whole poll loop; only submit attempts need
        // connection isolation.
        let client = http_client(Duration::from_secs(5), Duration::from_secs(15))?;
        let started = Instant::now();
        let mut streak = 0u32;

        for check in 1..=self.poll_check_limit {
            match self.poll_once(&client, &handle.id).await {
                Ok(resp) => {
                    streak = 0;
                    handle.last_status = resp.status;
                    match resp.status {
                        RemoteStatus::Done => {
                            return resp
                                .video_url
                                .filter(|url| !url.is_empty())
                                .ok_or(ViduError::MissingArtifact);
                        }
                        RemoteStatus::Failed => {
                            return Err(ViduError::Remote(
                                resp.error.unwrap_or_else(|| "unknown error".to_string()),
                            ));
                        }
                        RemoteStatus::Unrecognized => {
                            warn!(job_id = %handle.id, check, "unrecognized job status, still waiting");
                        }
                        status => {
                            debug!(job_id = %handle.id, %status, check, "job in progress");
                        }
                    }
                }
                Err(e) if e.is_transient_poll() => {
                    streak += 1;
                    warn!(job_id = %handle.id, streak, "status poll failed: {e}");
                    if streak >= self.streak_limit {
                        return Err(ViduError::Unstable { failures: streak });
                    }
                }
                Err(e) => return Err(e),
            }
            sleep(poll_delay(streak, self.poll_interval)).await;
        }

        Err(ViduError::PollTimeout {
            waited_secs: started.elapsed().as_secs(),
        })
    }
}

fn http_client(connect: Duration, total: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(connect)
        .timeout(total)
        .build()
}
