//! Wire types for the Vidu generation API.
//!
//! Covers the two endpoints the pipeline touches: job submission
//! (`POST /jobs`, multipart image upload) and status polling
//! (`GET /jobs/{id}`).

use serde::{Deserialize, Serialize};

/// Response body of a successful job submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Job identifier issued by the remote service.
    pub id: String,
}

/// Remote job status as reported by the status endpoint.
///
/// The service may grow new status names; anything unrecognized
/// deserializes to [`RemoteStatus::Unrecognized`] and is treated as
/// "still processing" by the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    Queued,
    Pending,
    Processing,
    Done,
    Failed,
    #[serde(other)]
    Unrecognized,
}

impl RemoteStatus {
    /// Whether the poll loop should keep waiting on this status.
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            RemoteStatus::Queued
                | RemoteStatus::Pending
                | RemoteStatus::Processing
                | RemoteStatus::Unrecognized
        )
    }
}

impl std::fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RemoteStatus::Queued => "queued",
            RemoteStatus::Pending => "pending",
            RemoteStatus::Processing => "processing",
            RemoteStatus::Done => "done",
            RemoteStatus::Failed => "failed",
            RemoteStatus::Unrecognized => "unrecognized",
        };
        write!(f, "{s}")
    }
}

/// Response body of the status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: RemoteStatus,
    /// Download URL for the generated video; populated once `status` is `done`.
    #[serde(default)]
    pub video_url: Option<String>,
    /// Remote-supplied error message; populated when `status` is `failed`.
    #[serde(default)]
    pub error: Option<String>,
}

/// Handle to a submitted remote job, updated while polling.
#[derive(Debug, Clone)]
pub struct RemoteJobHandle {
    /// Job id as issued by the remote service.
    pub id: String,
    /// Last status observed by the poll loop.
    pub last_status: RemoteStatus,
}

impl RemoteJobHandle {
    pub fn new(id: String) -> Self {
        Self {
            id,
            last_status: RemoteStatus::Queued,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_response_requires_id() {
        let resp: SubmitResponse = serde_json::from_str(r#"{"id": "J1"}"#).unwrap();
        assert_eq!(resp.id, "J1");

        let missing = serde_json::from_str::<SubmitResponse>(r#"{"job": "J1"}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn status_deserializes_known_values() {
        for (raw, expected) in [
            ("queued", RemoteStatus::Queued),
            ("pending", RemoteStatus::Pending),
            ("processing", RemoteStatus::Processing),
            ("done", RemoteStatus::Done),
            ("failed", RemoteStatus::Failed),
        ] {
            let json = format!(r#"{{"status": "{raw}"}}"#);
            let resp: StatusResponse = serde_json::from_str(&json).unwrap();
            assert_eq!(resp.status, expected);
            assert!(resp.video_url.is_none());
            assert!(resp.error.is_none());
        }
    }

    #[test]
    fn unknown_status_maps_to_unrecognized() {
        let resp: StatusResponse =
            serde_json::from_str(r#"{"status": "rendering_v2"}"#).unwrap();
        assert_eq!(resp.status, RemoteStatus::Unrecognized);
        assert!(resp.status.is_in_progress());
    }

    #[test]
    fn terminal_statuses_are_not_in_progress() {
        assert!(!RemoteStatus::Done.is_in_progress());
        assert!(!RemoteStatus::Failed.is_in_progress());
        assert!(RemoteStatus::Queued.is_in_progress());
        assert!(RemoteStatus::Processing.is_in_progress());
    }

    #[test]
    fn done_response_with_url() {
        let resp: StatusResponse = serde_json::from_str(
            r#"{"status": "done", "video_url": "http://x/v.mp4"}"#,
        )
        .unwrap();
        assert_eq!(resp.status, RemoteStatus::Done);
        assert_eq!(resp.video_url.as_deref(), Some("http://x/v.mp4"));
    }

    #[test]
    fn failed_response_with_error() {
        let resp: StatusResponse =
            serde_json::from_str(r#"{"status": "failed", "error": "nsfw content"}"#).unwrap();
        assert_eq!(resp.status, RemoteStatus::Failed);
        assert_eq!(resp.error.as_deref(), Some("nsfw content"));
    }
}
