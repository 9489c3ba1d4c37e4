//! Single-worker pipeline orchestration.
//!
//! One dedicated worker pulls jobs from a FIFO queue and drives each
//! through submit → poll → download → render, emitting progress
//! notifications on stage entry and exactly one terminal event per
//! accepted job. Admission is a single-slot atomic token: enqueueing
//! while a job is in flight is rejected, never silently queued.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::error::Failure;
use crate::fetch::ArtifactFetch;
use crate::render::RenderBackend;
use crate::vidu::VideoGenerator;

use super::job::{Job, PipelineEvent, Stage, TerminalEvent};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnqueueError {
    /// A job is already occupying the single pipeline slot.
    #[error("a job is already in flight, retry after it finishes")]
    Busy,
}

/// Caller-side handle: admission control plus job submission.
#[derive(Clone)]
pub struct PipelineHandle {
    busy: Arc<AtomicBool>,
    job_tx: mpsc::Sender<Job>,
}

impl PipelineHandle {
    /// Accept an image for processing, or reject if a job is in flight.
    ///
    /// Acquires the busy token before sending; the worker releases it
    /// after the terminal event has been delivered.
    pub fn enqueue(&self, image_path: PathBuf) -> Result<String, EnqueueError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EnqueueError::Busy);
        }

        let job = Job::new(image_path);
        let id = job.id.clone();
        if self.job_tx.try_send(job).is_err() {
            // Worker gone or queue full; give the slot back.
            self.busy.store(false, Ordering::Release);
            return Err(EnqueueError::Busy);
        }
        Ok(id)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// The four-stage pipeline over its collaborator seams.
pub struct Pipeline<V, F, R> {
    generator: V,
    fetcher: F,
    renderer: R,
    output_dir: PathBuf,
}

impl<V, F, R> Pipeline<V, F, R>
where
    V: VideoGenerator + 'static,
    F: ArtifactFetch + 'static,
    R: RenderBackend + 'static,
{
    pub fn new(generator: V, fetcher: F, renderer: R, output_dir: PathBuf) -> Self {
        Self {
            generator,
            fetcher,
            renderer,
            output_dir,
        }
    }

    /// Spawn the dedicated worker, returning the caller handle and the
    /// event stream to drain.
    pub fn start(self) -> (PipelineHandle, mpsc::UnboundedReceiver<PipelineEvent>) {
        let busy = Arc::new(AtomicBool::new(false));
        let (job_tx, job_rx) = mpsc::channel(1);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let worker_busy = Arc::clone(&busy);
        tokio::spawn(self.worker_loop(job_rx, event_tx, worker_busy));

        (PipelineHandle { busy, job_tx }, event_rx)
    }

    async fn worker_loop(
        self,
        mut jobs: mpsc::Receiver<Job>,
        events: mpsc::UnboundedSender<PipelineEvent>,
        busy: Arc<AtomicBool>,
    ) {
        while let Some(mut job) = jobs.recv().await {
            let event = self.process(&mut job, &events).await;
            if events
                .send(PipelineEvent::Terminal {
                    job_id: job.id.clone(),
                    event,
                })
                .is_err()
            {
                warn!(job_id = %job.id, "event receiver dropped, terminal event lost");
            }
            // The slot opens only after the terminal event is delivered.
            busy.store(false, Ordering::Release);
        }
    }

    /// Run one job to a terminal event. Every path resolves: no error
    /// escapes this boundary.
    async fn process(
        &self,
        job: &mut Job,
        events: &mpsc::UnboundedSender<PipelineEvent>,
    ) -> TerminalEvent {
        info!(job_id = %job.id, image = %job.image_path.display(), serial = %job.serial, "job started");
        match self.run_stages(job, events).await {
            Ok(output) => {
                info!(job_id = %job.id, output = %output.display(), "job succeeded");
                TerminalEvent::Success { output }
            }
            Err(failure) => {
                error!(job_id = %job.id, kind = %failure.kind, "job failed: {}", failure.message);
                TerminalEvent::Failure {
                    kind: failure.kind,
                    message: failure.message,
                }
            }
        }
    }

    async fn run_stages(
        &self,
        job: &mut Job,
        events: &mpsc::UnboundedSender<PipelineEvent>,
    ) -> Result<PathBuf, Failure> {
        self.enter(job, Stage::Submitting, "uploading image", events);
        let mut handle = self.generator.submit(&job.image_path).await?;

        self.enter(job, Stage::Polling, "waiting for remote generation", events);
        let url = self.generator.poll_until_complete(&mut handle).await?;

        self.enter(job, Stage::Downloading, "downloading generated video", events);
        let clip = self.output_dir.join(format!("{}_vidu.mp4", job.serial));
        self.fetcher.fetch(&url, &clip).await?;

        self.enter(job, Stage::Rendering, "rendering final video", events);
        let output = self.renderer.render(&clip, &job.serial).await?;
        Ok(output)
    }

    fn enter(
        &self,
        job: &mut Job,
        stage: Stage,
        message: &str,
        events: &mpsc::UnboundedSender<PipelineEvent>,
    ) {
        job.stage = stage;
        info!(job_id = %job.id, %stage, "{message}");
        let _ = events.send(PipelineEvent::Progress {
            job_id: job.id.clone(),
            stage,
            percent: stage.percent(),
            message: message.to_string(),
        });
    }
}
