//! Delivery of the finished video to a recipient.
//!
//! The pipeline itself never notifies anyone; the caller interface does,
//! once, after a successful terminal event. Transport is delegated to an
//! external program so mail/IM delivery stays outside this crate.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notify command not found: {0}")]
    MissingCommand(PathBuf),

    #[error("notify command exited with {0}")]
    Exit(std::process::ExitStatus),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Delivers a finished video to a recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &str, output: &Path) -> Result<(), NotifyError>;
}

/// Runs an external delivery program with the recipient and the output
/// path as its two arguments.
pub struct CommandNotifier {
    command: PathBuf,
}

impl CommandNotifier {
    pub fn new(command: PathBuf) -> Self {
        Self { command }
    }
}

#[async_trait]
impl Notifier for CommandNotifier {
    async fn notify(&self, recipient: &str, output: &Path) -> Result<(), NotifyError> {
        if !self.command.exists() {
            return Err(NotifyError::MissingCommand(self.command.clone()));
        }

        let status = tokio::process::Command::new(&self.command)
            .arg(recipient)
            .arg(output)
            .status()
            .await?;

        if status.success() {
            info!(recipient, output = %output.display(), "notification delivered");
            Ok(())
        } else {
            Err(NotifyError::Exit(status))
        }
    }
}
