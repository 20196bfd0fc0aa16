use std::path::PathBuf;

use uuid::Uuid;

use crate::common::hash::Fingerprint;

/// One admitted upload waiting for (or going through) the processing pipeline.
#[derive(Debug, Clone)]
pub struct Job {
    pub video_id: Uuid,
    pub file_name: String,
    pub temp_path: PathBuf,
    pub fingerprint: Fingerprint,
    pub producer_id: String,
}

impl Job {
    /// Allocates a fresh video id. Only called once the fingerprint has been
    /// checked, so rejected uploads never consume an id.
    pub fn new(
        file_name: String,
        temp_path: PathBuf,
        fingerprint: Fingerprint,
        producer_id: String,
    ) -> Self {
        Self {
            video_id: Uuid::new_v4(),
            file_name,
            temp_path,
            fingerprint,
            producer_id,
        }
    }
}
