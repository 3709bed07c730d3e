//! ffprobe-backed geometry probing.

use crate::binary::validate_binary_path;
use crate::metadata::VideoGeometry;
use crate::traits::MediaProber;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tokio::process::Command;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    display_aspect_ratio: Option<String>,
}

/// Parse `ffprobe -print_format json -show_streams` output into the first stream's
/// geometry.
pub fn parse_probe_output(stdout: &[u8]) -> Result<VideoGeometry> {
    let output: ProbeOutput =
        serde_json::from_slice(stdout).context("Failed to parse ffprobe output")?;

    let stream = output
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No video stream found"))?;

    let width = stream
        .width
        .filter(|w| *w > 0)
        .ok_or_else(|| anyhow!("Could not parse width"))?;
    let height = stream
        .height
        .filter(|h| *h > 0)
        .ok_or_else(|| anyhow!("Could not parse height"))?;

    Ok(VideoGeometry {
        width,
        height,
        display_aspect_ratio: stream.display_aspect_ratio.filter(|r| !r.is_empty()),
    })
}

pub struct FfprobeProber {
    ffprobe_path: String,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: String) -> Result<Self> {
        validate_binary_path("ffprobe", &ffprobe_path)?;
        Ok(Self { ffprobe_path })
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> Result<VideoGeometry> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .context("Failed to execute ffprobe")?;

        if !output.status.success() {
            return Err(anyhow!(
                "ffprobe failed ({}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let geometry = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            width = geometry.width,
            height = geometry.height,
            "Video probe completed"
        );

        Ok(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_landscape_stream() {
        let json = br#"{
            "streams": [{
                "index": 0,
                "codec_name": "h264",
                "codec_type": "video",
                "width": 1920,
                "height": 1080,
                "sample_aspect_ratio": "1:1",
                "display_aspect_ratio": "16:9"
            }]
        }"#;

        let geometry = parse_probe_output(json).unwrap();
        assert_eq!(geometry, VideoGeometry::new(1920, 1080, Some("16:9")));
    }

    #[test]
    fn test_parse_stream_without_aspect_ratio() {
        let json = br#"{"streams": [{"width": 1000, "height": 999}]}"#;
        let geometry = parse_probe_output(json).unwrap();
        assert_eq!(geometry.display_aspect_ratio, None);
    }

    #[test]
    fn test_parse_rejects_missing_stream_or_dimensions() {
        assert!(parse_probe_output(br#"{"streams": []}"#).is_err());
        assert!(parse_probe_output(br#"{}"#).is_err());
        assert!(parse_probe_output(br#"{"streams": [{"width": 1920}]}"#).is_err());
        assert!(parse_probe_output(br#"{"streams": [{"width": 0, "height": 1080}]}"#).is_err());
        assert!(parse_probe_output(b"not json").is_err());
    }

    #[test]
    fn test_rejects_unsafe_binary_path() {
        assert!(FfprobeProber::new("ffprobe && curl evil".to_string()).is_err());
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let prober = FfprobeProber::new("/nonexistent/bin/ffprobe".to_string()).unwrap();
        let err = prober.probe(Path::new("video.mp4")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to execute ffprobe"));
    }
}
