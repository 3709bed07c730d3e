//! Media toolchain seams.
//!
//! The upload pipeline only sees these traits; the ffprobe/ffmpeg implementations live in
//! [`crate::video`].

use crate::metadata::VideoGeometry;
use async_trait::async_trait;
use std::path::Path;

/// Reads the geometry of a fully written video file.
#[async_trait]
pub trait MediaProber: Send + Sync {
    /// Fails when the file cannot be probed or has no video stream with usable dimensions.
    async fn probe(&self, path: &Path) -> anyhow::Result<VideoGeometry>;
}

/// Rewrites a video container without re-encoding.
#[async_trait]
pub trait MediaRemuxer: Send + Sync {
    /// Write a fast-start copy of `input` to `output`. `output` already exists and is
    /// overwritten.
    async fn remux(&self, input: &Path, output: &Path) -> anyhow::Result<()>;
}
