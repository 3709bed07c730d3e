//! Orientation classification from probed geometry.

use crate::metadata::VideoGeometry;
use crate::traits::MediaProber;
use anyhow::Result;
use std::path::Path;
use tubely_core::Classification;

/// Classify a probed geometry.
///
/// A declared `16:9` or `9:16` aspect ratio wins. Otherwise the pixel dimensions decide:
/// width a multiple of 16 and height a multiple of 9 is `Landscape`, the transpose is
/// `Portrait`. Square frames satisfy both and are `Other`.
pub fn classify(geometry: &VideoGeometry) -> Classification {
    match geometry.display_aspect_ratio.as_deref() {
        Some("16:9") => return Classification::Landscape,
        Some("9:16") => return Classification::Portrait,
        _ => {}
    }

    let (w, h) = (geometry.width, geometry.height);
    if w == h {
        Classification::Other
    } else if w % 16 == 0 && h % 9 == 0 {
        Classification::Landscape
    } else if w % 9 == 0 && h % 16 == 0 {
        Classification::Portrait
    } else {
        Classification::Other
    }
}

/// Probe `path` and classify it. Probe failures propagate; there is no default class.
pub async fn classify_file(prober: &dyn MediaProber, path: &Path) -> Result<Classification> {
    let geometry = prober.probe(path).await?;
    let classification = classify(&geometry);
    tracing::debug!(
        width = geometry.width,
        height = geometry.height,
        display_aspect_ratio = ?geometry.display_aspect_ratio,
        classification = %classification,
        "Video classified"
    );
    Ok(classification)
}
