use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use super::model::VideoRecord;

/// In-memory index of processed videos keyed by video id.
#[derive(Clone, Default)]
pub struct MetadataStore {
    videos: Arc<RwLock<HashMap<Uuid, VideoRecord>>>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, record: VideoRecord) {
        self.videos.write().insert(record.id, record);
    }

    /// Snapshot of every record, in no particular order.
    pub fn list(&self) -> Vec<VideoRecord> {
        self.videos.read().values().cloned().collect()
    }

    #[cfg(test)]
    fn get(&self, id: &Uuid) -> Option<VideoRecord> {
        self.videos.read().get(id).cloned()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.videos.read().len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.videos.read().is_empty()
    }
}
