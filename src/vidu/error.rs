//! Error types for the Vidu API client.
//!
//! Every variant carries its classification with it: the submit and poll
//! loops decide whether to retry from the variant alone, never by
//! inspecting message text.

use thiserror::Error;

/// Errors that can occur while submitting or polling a remote job.
#[derive(Debug, Error)]
pub enum ViduError {
    /// The server returned HTTP 401: the API key is invalid or expired.
    #[error("API key invalid or expired")]
    Credential,

    /// The server returned HTTP 429.
    #[error("rate limited by the API")]
    RateLimited,

    /// The server returned a 5xx status.
    #[error("server error (status {status})")]
    Server { status: u16 },

    /// Any other unexpected HTTP error status.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body was not the expected JSON shape.
    #[error("malformed API response: {0}")]
    Protocol(String),

    /// The server returned HTTP 404 for the job id.
    #[error("job not found: {0}")]
    NotFound(String),

    /// The remote service reported the generation as failed.
    #[error("remote generation failed: {0}")]
    Remote(String),

    /// The job reached `done` without a video URL.
    #[error("job completed without a video URL")]
    MissingArtifact,

    /// Too many consecutive transient poll failures.
    #[error("{failures} consecutive poll failures, network unstable")]
    Unstable { failures: u32 },

    /// The wall-clock polling ceiling was exceeded.
    #[error("generation timed out after {waited_secs}s")]
    PollTimeout { waited_secs: u64 },

    /// Underlying network failure (DNS, refused connection, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Local I/O failure while reading the image payload.
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

impl ViduError {
    /// Whether a failed submit attempt should be retried.
    ///
    /// Connection errors, timeouts, 5xx responses and rate limiting are
    /// retryable; invalid credentials and malformed responses are not.
    pub fn is_retryable_submit(&self) -> bool {
        matches!(
            self,
            ViduError::RateLimited | ViduError::Server { .. } | ViduError::Network(_)
        )
    }

    /// Whether a failed status poll counts toward the transient streak
    /// rather than aborting the poll loop outright.
    ///
    /// Malformed bodies are transient here: a single garbled status
    /// response should not kill a job that is still rendering remotely.
    pub fn is_transient_poll(&self) -> bool {
        matches!(
            self,
            ViduError::Server { .. } | ViduError::Network(_) | ViduError::Protocol(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_is_never_retried() {
        let err = ViduError::Credential;
        assert!(!err.is_retryable_submit());
        assert!(!err.is_transient_poll());
    }

    #[test]
    fn server_errors_retry_on_both_paths() {
        let err = ViduError::Server { status: 503 };
        assert!(err.is_retryable_submit());
        assert!(err.is_transient_poll());
    }

    #[test]
    fn malformed_body_is_permanent_for_submit_transient_for_poll() {
        let err = ViduError::Protocol("missing field `id`".into());
        assert!(!err.is_retryable_submit());
        assert!(err.is_transient_poll());
    }

    #[test]
    fn not_found_aborts_polling() {
        let err = ViduError::NotFound("J1".into());
        assert!(!err.is_transient_poll());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            ViduError::Server { status: 502 }.to_string(),
            "server error (status 502)"
        );
        assert_eq!(
            ViduError::PollTimeout { waited_secs: 360 }.to_string(),
            "generation timed out after 360s"
        );
        assert_eq!(
            ViduError::MissingArtifact.to_string(),
            "job completed without a video URL"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ViduError>();
    }
}
