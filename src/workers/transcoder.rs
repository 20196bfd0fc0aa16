use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::time::Duration;

use futures_util::FutureExt;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::infrastructure::media::ffmpeg::TransformError;
use crate::infrastructure::storage::local::{
    StorageError, public_preview_path, public_video_path, video_extension,
};
use crate::modules::upload::model::Job;
use crate::modules::video::model::VideoRecord;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("move uploaded file into storage: {0}")]
    Placement(#[from] StorageError),
}

/// Where a job currently is. `Failed` is only reachable from `Placing`; every
/// later step degrades instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Queued,
    Placing,
    Transcoding,
    Previewing,
    Recorded,
    Failed,
}

/// Per-job pipeline state. Soft failures are kept here as data instead of
/// unwinding the pipeline.
#[derive(Debug)]
struct PipelineRun {
    stage: JobStage,
    compressed: bool,
    preview: Option<PathBuf>,
    soft_failures: Vec<(JobStage, TransformError)>,
}

impl PipelineRun {
    fn new() -> Self {
        Self {
            stage: JobStage::Queued,
            compressed: false,
            preview: None,
            soft_failures: Vec::new(),
        }
    }

    fn advance(&mut self, job: &Job, next: JobStage) {
        debug!(video_id = %job.video_id, from = ?self.stage, to = ?next, "Job stage");
        self.stage = next;
    }

    fn absorb(&mut self, job: &Job, err: TransformError) {
        warn!(
            video_id = %job.video_id,
            step = ?self.stage,
            error = %err,
            "Pipeline step failed, continuing without it"
        );
        self.soft_failures.push((self.stage, err));
    }
}

/// Runs one job through place → transcode → preview → record.
///
/// Only a failed placement aborts the job; `cancel` bounds the external tool runs.
pub async fn process_job(
    state: &AppState,
    job: Job,
    cancel: &CancellationToken,
) -> Result<VideoRecord, PipelineError> {
    let mut run = PipelineRun::new();
    let ext = video_extension(&job.file_name);

    run.advance(&job, JobStage::Placing);
    let placed = state.storage.video_path(job.video_id, &ext);
    if let Err(e) = state.storage.move_file(&job.temp_path, &placed).await {
        run.advance(&job, JobStage::Failed);
        state.storage.discard(&job.temp_path).await;
        return Err(e.into());
    }

    let mut source = placed.clone();
    if state.config.compress {
        run.advance(&job, JobStage::Transcoding);
        let compressed = state.storage.compressed_path(job.video_id, &ext);
        match state.transcoder.compress(&placed, &compressed, cancel).await {
            Ok(()) => {
                run.compressed = true;
                source = compressed;
            }
            Err(e) => {
                run.absorb(&job, e);
                state.storage.discard(&compressed).await;
            }
        }
    }

    run.advance(&job, JobStage::Previewing);
    let preview = state.storage.preview_path(job.video_id, &ext);
    match state.transcoder.extract_preview(&source, &preview, cancel).await {
        Ok(()) => run.preview = Some(preview),
        Err(e) => {
            run.absorb(&job, e);
            state.storage.discard(&preview).await;
        }
    }

    let record = VideoRecord {
        id: job.video_id,
        file_name: job.file_name.clone(),
        video_path: public_video_path(&placed),
        preview_path: run
            .preview
            .as_deref()
            .map(public_preview_path)
            .unwrap_or_default(),
        compressed: run.compressed,
        uploaded_at: OffsetDateTime::now_utc(),
        producer_id: job.producer_id.clone(),
        hash: job.fingerprint,
    };
    state.store.add(record.clone());
    run.advance(&job, JobStage::Recorded);

    if !run.soft_failures.is_empty() {
        debug!(video_id = %job.video_id, degraded = run.soft_failures.len(), "Recorded with degraded output");
    }
    Ok(record)
}

/// How long aborted workers get to record what was already placed.
const ABORT_SETTLE: Duration = Duration::from_secs(2);

/// Fixed set of workers sharing the admission queue's consumer end.
pub struct WorkerPool {
    workers: JoinSet<()>,
    stop: CancellationToken,
    abort: CancellationToken,
    state: AppState,
}

impl WorkerPool {
    pub fn start(state: &AppState, count: usize) -> Self {
        let abort = CancellationToken::new();
        // Cancelling `abort` also stops the dequeue loop.
        let stop = abort.child_token();
        let mut workers = JoinSet::new();

        for id in 0..count {
            let state = state.clone();
            let stop = stop.clone();
            let abort = abort.clone();
            workers.spawn(run_worker(id, state, stop, abort));
        }
        info!(count, capacity = state.queue.capacity(), "🎥 Started transcoder workers");

        Self {
            workers,
            stop,
            abort,
            state: state.clone(),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.workers.len()
    }

    /// Stops taking jobs, lets in-flight jobs finish for up to `grace`, then kills
    /// whatever tool is still running. An aborted job still gets its record, with
    /// the unfinished steps counted as soft failures. Jobs left in the queue are
    /// dropped with their temp files.
    pub async fn shutdown(mut self, grace: Duration) {
        self.stop.cancel();

        let drained = tokio::time::timeout(grace, async {
            while self.workers.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(
                remaining = self.workers.len(),
                grace_secs = grace.as_secs(),
                "Grace period elapsed, aborting in-flight jobs"
            );
            self.abort.cancel();

            let settled = tokio::time::timeout(ABORT_SETTLE, async {
                while self.workers.join_next().await.is_some() {}
            })
            .await;
            if settled.is_err() {
                warn!(remaining = self.workers.len(), "Workers did not settle after abort");
                self.workers.shutdown().await;
            }
        }

        let leftover = self.state.queue.close_and_drain();
        if !leftover.is_empty() {
            warn!(count = leftover.len(), "Dropping queued jobs on shutdown");
        }
        for job in leftover {
            self.state.storage.discard(&job.temp_path).await;
        }
        info!("Transcoder workers stopped");
    }
}

async fn run_worker(id: usize, state: AppState, stop: CancellationToken, abort: CancellationToken) {
    debug!(worker = id, "Worker listening");

    while let Some(job) = state.queue.dequeue(&stop).await {
        let video_id = job.video_id;
        info!(worker = id, %video_id, file_name = %job.file_name, "📦 Processing job");

        let result = AssertUnwindSafe(process_job(&state, job, &abort))
            .catch_unwind()
            .await;

        match result {
            Ok(Ok(record)) => info!(
                worker = id,
                %video_id,
                compressed = record.compressed,
                preview = !record.preview_path.is_empty(),
                "✅ Job recorded"
            ),
            Ok(Err(e)) => error!(worker = id, %video_id, error = %e, "❌ Job failed"),
            Err(_) => error!(worker = id, %video_id, "❌ Job panicked"),
        }
    }

    debug!(worker = id, "Worker exiting");
}
