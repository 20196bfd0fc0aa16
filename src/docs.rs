use utoipa::OpenApi;

use crate::modules::video::model::VideoRecord;

#[derive(OpenApi)]
#[openapi(
    paths(crate::modules::video::handler::list_videos),
    components(schemas(VideoRecord)),
    tags(
        (name = "Videos", description = "Processed upload metadata")
    )
)]
pub struct ApiDoc;
