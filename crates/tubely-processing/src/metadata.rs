use serde::{Deserialize, Serialize};

/// Geometry of the first video stream of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoGeometry {
    pub width: u32,
    pub height: u32,
    /// Container-declared display aspect ratio (e.g. `"16:9"`), when present.
    pub display_aspect_ratio: Option<String>,
}

impl VideoGeometry {
    pub fn new(width: u32, height: u32, display_aspect_ratio: Option<&str>) -> Self {
        Self {
            width,
            height,
            display_aspect_ratio: display_aspect_ratio.map(String::from),
        }
    }
}
