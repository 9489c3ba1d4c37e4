//! Local post-processing render via an external renderer executable.
//!
//! Invokes the renderer as a subprocess with a fixed argument set, the
//! source clip passed through the `AI_SRC` environment variable, and a
//! hard wall-clock timeout. Render failures are never retried here; the
//! orchestrator surfaces them directly.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{error, info};

/// Environment variable carrying the source clip path into the render
/// project.
const SOURCE_ENV: &str = "AI_SRC";

#[derive(Debug, Error)]
pub enum RenderError {
    /// The renderer executable does not exist at the configured path.
    #[error("renderer executable not found: {0}")]
    MissingExecutable(PathBuf),

    /// The render project/template file does not exist.
    #[error("render project not found: {0}")]
    MissingProject(PathBuf),

    /// The subprocess exceeded the wall-clock ceiling and was killed.
    #[error("render timed out after {0:?}")]
    Timeout(Duration),

    /// The subprocess exited with a non-zero status.
    #[error("renderer exited with {0}")]
    Exit(std::process::ExitStatus),

    /// Failed to spawn or wait on the subprocess.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders a downloaded clip into the final deliverable.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Render `source` under the given job serial, returning the final
    /// output path.
    async fn render(&self, source: &Path, serial: &str) -> Result<PathBuf, RenderError>;
}

pub struct LocalRenderer {
    exe: PathBuf,
    project: PathBuf,
    output_dir: PathBuf,
    composition: String,
    template: String,
    timeout: Duration,
}

impl LocalRenderer {
    pub fn new(exe: PathBuf, project: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            exe,
            project,
            output_dir,
            composition: "OUT".to_string(),
            template: "AI_H264".to_string(),
            timeout: Duration::from_secs(300),
        }
    }

    /// Override the render timeout (used in tests and for slow machines).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl RenderBackend for LocalRenderer {
    async fn render(&self, source: &Path, serial: &str) -> Result<PathBuf, RenderError> {
        if !self.exe.exists() {
            return Err(RenderError::MissingExecutable(self.exe.clone()));
        }
        if !self.project.exists() {
            return Err(RenderError::MissingProject(self.project.clone()));
        }
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let output = self.output_dir.join(format!("{serial}_final.mp4"));

        let mut command = tokio::process::Command::new(&self.exe);
        command
            .arg("-project")
            .arg(&self.project)
            .arg("-comp")
            .arg(&self.composition)
            .arg("-RStemplate")
            .arg(&self.template)
            .arg("-output")
            .arg(&output)
            .args(["-s", "0", "-e", "0", "-mp", "-v", "ERRORS"])
            .env(SOURCE_ENV, source)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        info!(exe = %self.exe.display(), output = %output.display(), "starting render");
        let mut child = command.spawn()?;

        match timeout(self.timeout, child.wait()).await {
            Err(_) => {
                error!(timeout = ?self.timeout, "render timed out, killing subprocess");
                child.kill().await.ok();
                Err(RenderError::Timeout(self.timeout))
            }
            Ok(Err(e)) => Err(RenderError::Io(e)),
            Ok(Ok(status)) if status.success() => {
                info!(output = %output.display(), "render finished");
                Ok(output)
            }
            Ok(Ok(status)) => Err(RenderError::Exit(status)),
        }
    }
}
