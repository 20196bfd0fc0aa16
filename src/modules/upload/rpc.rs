//! Wire types for `mediaupload.MediaUploadService` (see `proto/media_upload.proto`).

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UploadChunk {
    #[prost(string, tag = "1")]
    pub producer_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub file_name: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "3")]
    pub data: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UploadStatus {
    #[prost(enumeration = "upload_status::Result", tag = "1")]
    pub result: i32,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub video_id: ::prost::alloc::string::String,
}

pub mod upload_status {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Result {
        Ok = 0,
        Duplicate = 1,
        QueueFull = 2,
        Error = 3,
    }
}

include!(concat!(env!("OUT_DIR"), "/mediaupload.MediaUploadService.rs"));
