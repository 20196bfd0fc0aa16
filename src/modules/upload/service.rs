use futures_util::{Stream, StreamExt};
use thiserror::Error;
use tonic::Status;
use tracing::{debug, info, warn};

use super::dto::UploadOutcome;
use super::model::Job;
use super::rpc::UploadChunk;
use crate::common::upload::TempUploadWriter;
use crate::state::AppState;

pub const PLACEHOLDER_FILE_NAME: &str = "upload";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{context}: {source}")]
    Internal {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("receive chunk: {0}")]
    Receive(Status),
}

impl IngestError {
    fn internal(context: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| Self::Internal { context, source }
    }
}

impl From<IngestError> for Status {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::InvalidInput(msg) => Status::invalid_argument(msg),
            other => Status::internal(other.to_string()),
        }
    }
}

pub struct UploadService;

impl UploadService {
    /// Drains one upload stream into temp storage and decides its fate.
    ///
    /// The fingerprint is claimed before a job id is allocated; the claim only
    /// becomes permanent once the job is actually admitted.
    pub async fn ingest<S>(state: &AppState, mut chunks: S) -> Result<UploadOutcome, IngestError>
    where
        S: Stream<Item = Result<UploadChunk, Status>> + Unpin,
    {
        let mut writer = TempUploadWriter::create(state.storage.tmp_dir())
            .await
            .map_err(IngestError::internal("create temp file"))?;

        let mut file_name: Option<String> = None;
        let mut producer_id: Option<String> = None;

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(IngestError::Receive)?;

            writer
                .write_chunk(&chunk.data)
                .await
                .map_err(IngestError::internal("write chunk"))?;

            if file_name.is_none() {
                file_name = sanitize_file_name(&chunk.file_name);
            }
            if producer_id.is_none() {
                let trimmed = chunk.producer_id.trim();
                if !trimmed.is_empty() {
                    producer_id = Some(trimmed.to_string());
                }
            }
        }

        let file_name = file_name
            .ok_or_else(|| IngestError::InvalidInput("file_name is required".into()))?;
        if writer.bytes_written() == 0 {
            return Err(IngestError::InvalidInput(format!(
                "no data received for file {file_name}"
            )));
        }
        let producer_id = producer_id.unwrap_or_default();

        let staged = writer
            .finish()
            .await
            .map_err(IngestError::internal("close temp file"))?;
        let fingerprint = staged.fingerprint;
        let size = staged.size;

        let Some(claim) = state.dupes.claim(fingerprint) else {
            info!(%fingerprint, file_name = %file_name, producer_id = %producer_id, "Duplicate upload rejected");
            return Ok(UploadOutcome::Duplicate);
        };

        let temp_path = staged
            .keep()
            .map_err(IngestError::internal("persist temp file"))?;
        let job = Job::new(file_name, temp_path, fingerprint, producer_id);
        let video_id = job.video_id;

        if let Err(job) = state.queue.try_enqueue(job) {
            warn!(
                %fingerprint,
                file_name = %job.file_name,
                capacity = state.queue.capacity(),
                "Admission queue full, dropping upload"
            );
            state.storage.discard(&job.temp_path).await;
            return Ok(UploadOutcome::QueueFull);
        }
        claim.commit();

        info!(%video_id, %fingerprint, bytes = size, queued = state.queue.len(), "Upload admitted");
        Ok(UploadOutcome::Accepted { video_id })
    }
}

/// Reduces a client-supplied name to its final path component.
///
/// Returns `None` when nothing was supplied; names that reduce to nothing usable
/// (`/`, `.`, `..`) become [`PLACEHOLDER_FILE_NAME`].
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let base = trimmed
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let name = match base {
        "" | "." | ".." => PLACEHOLDER_FILE_NAME,
        other => other,
    };
    debug!(raw, name, "Sanitized file name");
    Some(name.to_string())
}
