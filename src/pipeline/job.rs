//! Job data model and the events the pipeline emits.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FailureKind;

/// The active stages a job moves through. `Idle` is implicit (no job in
/// the slot); terminal outcomes are carried by [`TerminalEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Submitting,
    Polling,
    Downloading,
    Rendering,
}

impl Stage {
    /// Coarse progress percentage reported on entry to the stage.
    /// Monotonically non-decreasing across the pipeline; 100 is reported
    /// with the terminal event.
    pub fn percent(&self) -> u8 {
        match self {
            Stage::Submitting => 10,
            Stage::Polling => 20,
            Stage::Downloading => 40,
            Stage::Rendering => 70,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Submitting => "submitting",
            Stage::Polling => "polling",
            Stage::Downloading => "downloading",
            Stage::Rendering => "rendering",
        };
        write!(f, "{s}")
    }
}

/// One end-to-end request: one input image, one final rendered artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub image_path: PathBuf,
    /// Second-resolution serial derived from the submission time; names
    /// the intermediate and final artifacts so jobs never collide.
    pub serial: String,
    pub submitted_at: DateTime<Utc>,
    pub stage: Stage,
}

impl Job {
    pub fn new(image_path: PathBuf) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            image_path,
            serial: now.format("%Y%m%d-%H%M%S").to_string(),
            submitted_at: now,
            stage: Stage::Submitting,
        }
    }
}

/// The single success-or-failure notification that closes out a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalEvent {
    Success { output: PathBuf },
    Failure { kind: FailureKind, message: String },
}

/// Messages delivered from the worker to the caller interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Advisory telemetry emitted on entry to each stage.
    Progress {
        job_id: String,
        stage: Stage,
        percent: u8,
        message: String,
    },
    /// Exactly one per accepted job.
    Terminal {
        job_id: String,
        event: TerminalEvent,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_starts_at_submitting_with_a_timestamp_serial() {
        let job = Job::new(PathBuf::from("photo.jpg"));
        assert_eq!(job.stage, Stage::Submitting);
        // %Y%m%d-%H%M%S
        assert_eq!(job.serial.len(), 15);
        assert_eq!(&job.serial[8..9], "-");
        assert!(job.serial[..8].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(job.serial, job.submitted_at.format("%Y%m%d-%H%M%S").to_string());
    }

    #[test]
    fn job_ids_are_unique() {
        let a = Job::new(PathBuf::from("a.jpg"));
        let b = Job::new(PathBuf::from("b.jpg"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn stage_percentages_are_monotonic() {
        let stages = [
            Stage::Submitting,
            Stage::Polling,
            Stage::Downloading,
            Stage::Rendering,
        ];
        let mut prev = 0;
        for stage in stages {
            assert!(stage.percent() > prev);
            prev = stage.percent();
        }
        assert!(prev < 100);
    }

    #[test]
    fn terminal_event_serialization_roundtrip() {
        let event = TerminalEvent::Failure {
            kind: FailureKind::Timeout,
            message: "remote generation timed out".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: TerminalEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
