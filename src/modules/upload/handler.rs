use tonic::{Request, Response, Status, Streaming};
use tracing::{error, warn};

use super::rpc::media_upload_service_server::MediaUploadService;
use super::rpc::{UploadChunk, UploadStatus};
use super::service::{IngestError, UploadService};
use crate::state::AppState;

#[derive(Clone)]
pub struct UploadHandler {
    state: AppState,
}

impl UploadHandler {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[tonic::async_trait]
impl MediaUploadService for UploadHandler {
    #[tracing::instrument(skip_all, fields(remote = ?request.remote_addr()))]
    async fn upload_video(
        &self,
        request: Request<Streaming<UploadChunk>>,
    ) -> Result<Response<UploadStatus>, Status> {
        match UploadService::ingest(&self.state, request.into_inner()).await {
            Ok(outcome) => Ok(Response::new(outcome.into())),
            Err(e @ IngestError::InvalidInput(_)) => {
                warn!(error = %e, "Rejected upload");
                Err(e.into())
            }
            Err(e) => {
                error!(error = %e, "Upload failed");
                Err(e.into())
            }
        }
    }
}
