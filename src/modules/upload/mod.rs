use crate::state::AppState;

pub mod dedup;
pub mod dto;
pub mod handler;
pub mod model;
pub mod rpc;
pub mod service;

use rpc::media_upload_service_server::MediaUploadServiceServer;

pub fn grpc_service(state: AppState) -> MediaUploadServiceServer<handler::UploadHandler> {
    MediaUploadServiceServer::new(handler::UploadHandler::new(state))
}
