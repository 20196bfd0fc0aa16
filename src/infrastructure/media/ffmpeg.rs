use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Length of the generated preview clip, in seconds.
pub const PREVIEW_SECONDS: u32 = 10;
pub const PREVIEW_SCALE: &str = "scale=640:-2";

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to launch {}: {source}", .binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with {status}: {output}", .binary.display())]
    Failed {
        binary: PathBuf,
        status: std::process::ExitStatus,
        output: String,
    },

    #[error("cancelled by shutdown")]
    Cancelled,
}

/// The two external transforms a job goes through.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Re-encodes `input` into a smaller sibling at `output`.
    async fn compress(
        &self,
        input: &Path,
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), TransformError>;

    /// Cuts a short, scaled, silent clip from `input` into `output`.
    async fn extract_preview(
        &self,
        input: &Path,
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), TransformError>;
}

#[derive(Clone, Debug)]
pub struct FfmpegTranscoder {
    binary: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn compress_args(input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".into(),
            "-i".into(),
            input.to_string_lossy().into_owned(),
            "-vcodec".into(),
            "libx264".into(),
            "-preset".into(),
            "veryfast".into(),
            "-crf".into(),
            "28".into(),
            "-acodec".into(),
            "aac".into(),
            output.to_string_lossy().into_owned(),
        ]
    }

    pub fn preview_args(input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".into(),
            "-i".into(),
            input.to_string_lossy().into_owned(),
            "-t".into(),
            PREVIEW_SECONDS.to_string(),
            "-vf".into(),
            PREVIEW_SCALE.into(),
            "-an".into(),
            output.to_string_lossy().into_owned(),
        ]
    }

    /// Runs the tool to completion. The child is killed if `cancel` fires first.
    async fn run(&self, args: Vec<String>, cancel: &CancellationToken) -> Result<(), TransformError> {
        if cancel.is_cancelled() {
            return Err(TransformError::Cancelled);
        }
        debug!(binary = %self.binary.display(), ?args, "Running ffmpeg");

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TransformError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        let output = tokio::select! {
            _ = cancel.cancelled() => return Err(TransformError::Cancelled),
            output = child.wait_with_output() => output.map_err(|source| TransformError::Spawn {
                binary: self.binary.clone(),
                source,
            })?,
        };

        if output.status.success() {
            return Ok(());
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Err(TransformError::Failed {
            binary: self.binary.clone(),
            status: output.status,
            output: combined.trim().to_string(),
        })
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn compress(
        &self,
        input: &Path,
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), TransformError> {
        self.run(Self::compress_args(input, output), cancel).await
    }

    async fn extract_preview(
        &self,
        input: &Path,
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), TransformError> {
        self.run(Self::preview_args(input, output), cancel).await
    }
}
