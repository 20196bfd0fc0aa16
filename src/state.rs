use std::sync::Arc;

use crate::config::settings::AppConfig;
use crate::infrastructure::media::ffmpeg::{FfmpegTranscoder, Transcoder};
use crate::infrastructure::queue::admission::AdmissionQueue;
use crate::infrastructure::storage::local::LocalStorage;
use crate::modules::upload::dedup::DuplicateDetector;
use crate::modules::video::repository::MetadataStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: LocalStorage,
    pub queue: AdmissionQueue,
    pub dupes: DuplicateDetector,
    pub store: MetadataStore,
    pub transcoder: Arc<dyn Transcoder>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let transcoder = Arc::new(FfmpegTranscoder::new(config.ffmpeg_path.clone()));
        Self::with_transcoder(config, transcoder)
    }

    pub fn with_transcoder(config: AppConfig, transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            storage: LocalStorage::new(&config.data_dir),
            queue: AdmissionQueue::new(config.queue_capacity),
            dupes: DuplicateDetector::new(),
            store: MetadataStore::new(),
            transcoder,
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    use super::AppState;
    use crate::config::settings::AppConfig;
    use crate::infrastructure::media::ffmpeg::{TransformError, Transcoder};

    /// Copies input to output instead of running ffmpeg; either step can be told to
    /// fail, or to block until cancelled.
    #[derive(Default)]
    pub struct FakeTranscoder {
        pub fail_compress: bool,
        pub fail_preview: bool,
        pub hang: bool,
        pub compress_calls: AtomicUsize,
        pub preview_calls: AtomicUsize,
    }

    impl FakeTranscoder {
        fn failure() -> TransformError {
            TransformError::Spawn {
                binary: "fake-ffmpeg".into(),
                source: std::io::Error::other("simulated failure"),
            }
        }

        async fn hang_until(&self, cancel: &CancellationToken) -> Result<(), TransformError> {
            if self.hang {
                cancel.cancelled().await;
                return Err(TransformError::Cancelled);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Transcoder for FakeTranscoder {
        async fn compress(
            &self,
            input: &Path,
            output: &Path,
            cancel: &CancellationToken,
        ) -> Result<(), TransformError> {
            self.compress_calls.fetch_add(1, Ordering::SeqCst);
            self.hang_until(cancel).await?;
            if self.fail_compress {
                return Err(Self::failure());
            }
            tokio::fs::copy(input, output).await.map_err(|source| TransformError::Spawn {
                binary: "fake-ffmpeg".into(),
                source,
            })?;
            Ok(())
        }

        async fn extract_preview(
            &self,
            input: &Path,
            output: &Path,
            cancel: &CancellationToken,
        ) -> Result<(), TransformError> {
            self.preview_calls.fetch_add(1, Ordering::SeqCst);
            self.hang_until(cancel).await?;
            if self.fail_preview {
                return Err(Self::failure());
            }
            tokio::fs::copy(input, output).await.map_err(|source| TransformError::Spawn {
                binary: "fake-ffmpeg".into(),
                source,
            })?;
            Ok(())
        }
    }

    pub async fn test_state(queue_capacity: usize) -> (TempDir, AppState) {
        test_state_with(queue_capacity, Arc::new(FakeTranscoder::default())).await
    }

    pub async fn test_state_with(
        queue_capacity: usize,
        transcoder: Arc<dyn Transcoder>,
    ) -> (TempDir, AppState) {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            queue_capacity,
            worker_count: 1,
            ..AppConfig::default()
        };
        let state = AppState::with_transcoder(config, transcoder);
        state.storage.ensure_dirs().await.expect("storage dirs");
        (dir, state)
    }
}
