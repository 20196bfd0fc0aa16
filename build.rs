use tonic_build::manual::{Builder, Method, Service};

fn main() {
    // Message types live in src/modules/upload/rpc.rs; only the service glue is generated.
    let upload = Service::builder()
        .name("MediaUploadService")
        .package("mediaupload")
        .method(
            Method::builder()
                .name("upload_video")
                .route_name("UploadVideo")
                .input_type("crate::modules::upload::rpc::UploadChunk")
                .output_type("crate::modules::upload::rpc::UploadStatus")
                .codec_path("tonic::codec::ProstCodec")
                .client_streaming()
                .build(),
        )
        .build();

    Builder::new().compile(&[upload]);
}
