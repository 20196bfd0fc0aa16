use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

pub const VIDEOS_MOUNT: &str = "/videos";
pub const PREVIEWS_MOUNT: &str = "/previews";

const DEFAULT_EXTENSION: &str = ".mp4";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{} exists and is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Directory layout under the data root: permanent videos, previews, and
/// in-flight temp uploads.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    videos_dir: PathBuf,
    previews_dir: PathBuf,
    tmp_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let root = data_dir.as_ref();
        Self {
            videos_dir: root.join("videos"),
            previews_dir: root.join("previews"),
            tmp_dir: root.join("tmp"),
        }
    }

    /// Creates every storage directory that does not exist yet.
    pub async fn ensure_dirs(&self) -> Result<(), StorageError> {
        for dir in [&self.videos_dir, &self.previews_dir, &self.tmp_dir] {
            match tokio::fs::metadata(dir).await {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => return Err(StorageError::NotADirectory(dir.clone())),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tokio::fs::create_dir_all(dir)
                        .await
                        .map_err(|e| StorageError::io("create", dir, e))?;
                    info!(dir = %dir.display(), "Created storage directory");
                }
                Err(e) => return Err(StorageError::io("stat", dir, e)),
            }
        }
        Ok(())
    }

    pub fn videos_dir(&self) -> &Path {
        &self.videos_dir
    }

    pub fn previews_dir(&self) -> &Path {
        &self.previews_dir
    }

    pub fn tmp_dir(&self) -> &Path {
        &self.tmp_dir
    }

    /// Permanent location for a job's primary video.
    pub fn video_path(&self, video_id: Uuid, ext: &str) -> PathBuf {
        self.videos_dir.join(format!("{video_id}{ext}"))
    }

    pub fn compressed_path(&self, video_id: Uuid, ext: &str) -> PathBuf {
        self.videos_dir.join(format!("{video_id}_compressed{ext}"))
    }

    pub fn preview_path(&self, video_id: Uuid, ext: &str) -> PathBuf {
        self.previews_dir.join(format!("{video_id}_preview{ext}"))
    }

    /// Moves `src` to `dst`, falling back to copy-then-delete when a plain rename
    /// is not possible (e.g. across filesystems).
    pub async fn move_file(&self, src: &Path, dst: &Path) -> Result<(), StorageError> {
        match tokio::fs::rename(src, dst).await {
            Ok(()) => return Ok(()),
            Err(e) => debug!(
                src = %src.display(),
                dst = %dst.display(),
                error = %e,
                "Rename failed, copying instead"
            ),
        }

        tokio::fs::copy(src, dst)
            .await
            .map_err(|e| StorageError::io("copy", src, e))?;
        tokio::fs::remove_file(src)
            .await
            .map_err(|e| StorageError::io("remove", src, e))
    }

    pub async fn discard(&self, path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != io::ErrorKind::NotFound {
                debug!(path = %path.display(), error = %e, "Failed to remove file");
            }
        }
    }
}

/// Lower-cased extension of `file_name` including the dot, or `.mp4`.
pub fn video_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

pub fn public_video_path(file: &Path) -> String {
    public_path(VIDEOS_MOUNT, file)
}

pub fn public_preview_path(file: &Path) -> String {
    public_path(PREVIEWS_MOUNT, file)
}

fn public_path(mount: &str, file: &Path) -> String {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{mount}/{name}")
}
