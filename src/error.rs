//! Failure taxonomy and top-level error type.
//!
//! Every stage-local error is classified into exactly one [`FailureKind`]
//! at the orchestrator boundary and paired with a user-facing message.
//! The kind is attached where the error originates, never re-derived
//! from message text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::FetchError;
use crate::render::RenderError;
use crate::vidu::ViduError;

/// Classification of a terminal job failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Credential rejected by the remote service; never retried.
    CredentialInvalid,
    /// Rate limiting persisted through the retry ceiling.
    RateLimited,
    /// Connection, timeout, 5xx or recoverable-malformed-body failures
    /// that exhausted the stage's retry policy.
    Transient,
    /// The remote job id is unknown to the service.
    NotFound,
    /// A stage-specific wall-clock ceiling was exceeded.
    Timeout,
    /// Downloaded byte count did not match the declared content length.
    IncompleteTransfer,
    /// A required local path (executable, project file) is absent.
    ConfigurationMissing,
    /// The remote service reported the generation as failed, or completed
    /// it without producing an artifact.
    RemoteFailed,
    /// The local renderer exited with a non-zero status.
    RenderFailed,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureKind::CredentialInvalid => "credential invalid",
            FailureKind::RateLimited => "rate limited",
            FailureKind::Transient => "transient failure",
            FailureKind::NotFound => "not found",
            FailureKind::Timeout => "timeout",
            FailureKind::IncompleteTransfer => "incomplete transfer",
            FailureKind::ConfigurationMissing => "configuration missing",
            FailureKind::RemoteFailed => "remote failure",
            FailureKind::RenderFailed => "render failed",
        };
        write!(f, "{s}")
    }
}

/// A classified, user-presentable job failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl From<ViduError> for Failure {
    fn from(err: ViduError) -> Self {
        let kind = match &err {
            ViduError::Credential => FailureKind::CredentialInvalid,
            ViduError::RateLimited => FailureKind::RateLimited,
            ViduError::NotFound(_) => FailureKind::NotFound,
            ViduError::PollTimeout { .. } => FailureKind::Timeout,
            ViduError::Remote(_) | ViduError::MissingArtifact => FailureKind::RemoteFailed,
            ViduError::Server { .. }
            | ViduError::Api { .. }
            | ViduError::Protocol(_)
            | ViduError::Unstable { .. }
            | ViduError::Network(_)
            | ViduError::Io(_) => FailureKind::Transient,
        };
        let message = match &err {
            ViduError::Credential => "API key is invalid or expired, check your settings".into(),
            ViduError::RateLimited => "API rate limit reached, try again later".into(),
            ViduError::Unstable { .. } | ViduError::Network(_) => {
                format!("network unstable, check your connection and retry ({err})")
            }
            ViduError::PollTimeout { waited_secs } => {
                format!("remote generation timed out after {waited_secs}s, try again later")
            }
            _ => err.to_string(),
        };
        Failure { kind, message }
    }
}

impl From<FetchError> for Failure {
    fn from(err: FetchError) -> Self {
        let kind = match &err {
            FetchError::Incomplete { .. } => FailureKind::IncompleteTransfer,
            FetchError::Status { status: 404 } => FailureKind::NotFound,
            FetchError::Status { .. } | FetchError::Network(_) | FetchError::Io(_) => {
                FailureKind::Transient
            }
        };
        Failure {
            kind,
            message: format!("video download failed: {err}"),
        }
    }
}

impl From<RenderError> for Failure {
    fn from(err: RenderError) -> Self {
        let kind = match &err {
            RenderError::MissingExecutable(_) | RenderError::MissingProject(_) => {
                FailureKind::ConfigurationMissing
            }
            RenderError::Timeout(_) => FailureKind::Timeout,
            RenderError::Exit(_) | RenderError::Io(_) => FailureKind::RenderFailed,
        };
        Failure {
            kind,
            message: format!("local render failed: {err}"),
        }
    }
}

/// Top-level error for the binary's own plumbing (config, I/O, wiring).
/// Stage failures never surface here; they become terminal events.
#[derive(Debug, Error)]
pub enum BoothError {
    #[error("config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
