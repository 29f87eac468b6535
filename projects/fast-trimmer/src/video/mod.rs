pub mod ffmpeg_trimmer;

use crate::trim::matcher::TrimWindow;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub use ffmpeg_trimmer::{FfmpegTrimmer, TrimmerConfig};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("source video not found: {}", .0.display())]
    SourceMissing(PathBuf),
    #[error("failed to start encoder: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("encoder timed out after {0:?}")]
    Timeout(Duration),
    #[error("encoder exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("encoder i/o error: {0}")]
    Io(#[source] std::io::Error),
}

/// Produces a video covering exactly `window` of `source` at `output`.
#[async_trait]
pub trait TrimExecutor: Send + Sync {
    async fn trim(
        &self,
        source: &Path,
        window: TrimWindow,
        output: &Path,
    ) -> Result<(), ExecError>;
}
