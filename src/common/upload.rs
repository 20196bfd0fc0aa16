use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::common::hash::{ContentHasher, Fingerprint};

/// Streams an upload into a private temp file while hashing it.
///
/// The file is removed when the writer (or the [`StagedUpload`] it produces) is
/// dropped, unless ownership of the path is taken with [`StagedUpload::keep`].
pub struct TempUploadWriter {
    file: File,
    path: TempPath,
    hasher: ContentHasher,
}

impl TempUploadWriter {
    pub async fn create(dir: &Path) -> std::io::Result<Self> {
        let dir = dir.to_path_buf();
        let named = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix("upload-")
                .suffix(".tmp")
                .tempfile_in(dir)
        })
        .await
        .map_err(std::io::Error::other)??;
        let (file, path) = named.into_parts();

        debug!(path = %path.display(), "Opened temp upload");

        Ok(Self {
            file: File::from_std(file),
            path,
            hasher: ContentHasher::new(),
        })
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.file.write_all(chunk).await?;
        self.hasher.update(chunk);
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.hasher.bytes_hashed()
    }

    pub async fn finish(mut self) -> std::io::Result<StagedUpload> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        drop(self.file);

        Ok(StagedUpload {
            size: self.hasher.bytes_hashed(),
            fingerprint: self.hasher.finalize(),
            path: self.path,
        })
    }
}

/// A fully written, closed temp upload.
pub struct StagedUpload {
    pub fingerprint: Fingerprint,
    pub size: u64,
    path: TempPath,
}

impl StagedUpload {
    #[cfg(test)]
    fn path(&self) -> &Path {
        &self.path
    }

    /// Detaches the file from automatic cleanup.
    pub fn keep(self) -> std::io::Result<PathBuf> {
        self.path.keep().map_err(|e| e.error)
    }
}
