//! ffmpeg-backed fast-start remuxing.

use crate::binary::validate_binary_path;
use crate::traits::MediaRemuxer;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Copies all streams into a new MP4 with the `moov` atom moved to the front.
pub struct FfmpegRemuxer {
    ffmpeg_path: String,
}

impl FfmpegRemuxer {
    pub fn new(ffmpeg_path: String) -> Result<Self> {
        validate_binary_path("ffmpeg", &ffmpeg_path)?;
        Ok(Self { ffmpeg_path })
    }
}

#[async_trait]
impl MediaRemuxer for FfmpegRemuxer {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn remux(&self, input: &Path, output: &Path) -> Result<()> {
        let start = std::time::Instant::now();

        let result = Command::new(&self.ffmpeg_path)
            .args(["-v", "error", "-y", "-i"])
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(output)
            .kill_on_drop(true)
            .output()
            .await
            .context("Failed to execute ffmpeg")?;

        if !result.status.success() {
            return Err(anyhow!(
                "ffmpeg failed ({}): {}",
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            ));
        }

        let size = tokio::fs::metadata(output)
            .await
            .context("ffmpeg produced no output file")?
            .len();
        if size == 0 {
            return Err(anyhow!("ffmpeg produced an empty output file"));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            size_bytes = size,
            "Fast-start remux completed"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unsafe_binary_path() {
        assert!(FfmpegRemuxer::new("ffmpeg|sh".to_string()).is_err());
        assert!(FfmpegRemuxer::new("/usr/bin/ffmpeg".to_string()).is_ok());
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let remuxer = FfmpegRemuxer::new("/nonexistent/bin/ffmpeg".to_string()).unwrap();
        let err = remuxer
            .remux(&dir.path().join("in.mp4"), &dir.path().join("out.mp4"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to execute ffmpeg"));
    }
}
