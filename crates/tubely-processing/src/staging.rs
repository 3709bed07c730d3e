//! Temporary on-disk staging for uploads.
//!
//! Every staged file is owned by a [`StagedFile`] and removed when that handle is dropped,
//! whether the upload finished, failed, or its future was cancelled mid-stream.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

const UPLOAD_PREFIX: &str = "tubely-upload-";
const REMUX_PREFIX: &str = "tubely-remux-";
const SUFFIX: &str = ".mp4";

#[derive(Debug, thiserror::Error)]
pub enum StageError<E> {
    #[error("Upload stream failed: {0}")]
    Body(E),

    #[error("Upload exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("Staging I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// A uniquely named temporary file, deleted on drop.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Creates staged files in one directory, capping how many bytes a single upload may write.
#[derive(Debug, Clone)]
pub struct TempStage {
    dir: PathBuf,
    max_bytes: u64,
}

impl TempStage {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    /// Write the whole body to a new staged file.
    ///
    /// Fails with [`StageError::TooLarge`] as soon as the running total passes the cap; the
    /// partial file is removed on every error path.
    pub async fn materialize<S, E>(&self, body: S) -> Result<StagedFile, StageError<E>>
    where
        S: Stream<Item = Result<Bytes, E>>,
    {
        let (file, path) = tempfile::Builder::new()
            .prefix(UPLOAD_PREFIX)
            .suffix(SUFFIX)
            .tempfile_in(&self.dir)?
            .into_parts();
        let staged = StagedFile { path };
        let mut file = tokio::fs::File::from_std(file);
        let mut body = std::pin::pin!(body);
        let mut written: u64 = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(StageError::Body)?;
            written += chunk.len() as u64;
            if written > self.max_bytes {
                return Err(StageError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::debug!(
            path = %staged.path().display(),
            size_bytes = written,
            "Upload staged"
        );

        Ok(staged)
    }

    /// Reserve an empty staged file for a tool to write into.
    pub fn reserve(&self) -> io::Result<StagedFile> {
        let path = tempfile::Builder::new()
            .prefix(REMUX_PREFIX)
            .suffix(SUFFIX)
            .tempfile_in(&self.dir)?
            .into_temp_path();
        Ok(StagedFile { path })
    }
}
