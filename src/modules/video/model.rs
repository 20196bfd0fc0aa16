use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::hash::Fingerprint;

/// Description of a processed upload, as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: Uuid,
    pub file_name: String,
    pub video_path: String,
    /// Empty when preview extraction failed.
    pub preview_path: String,
    pub compressed: bool,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub uploaded_at: OffsetDateTime,
    pub producer_id: String,
    #[schema(value_type = String)]
    pub hash: Fingerprint,
}
