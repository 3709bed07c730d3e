//! Tubely Processing Library
//!
//! Local media work done on an upload before it reaches storage: staging the incoming bytes
//! on disk, probing the video geometry, and rewriting the container for progressive
//! playback.

pub mod binary;
pub mod metadata;
pub mod staging;
pub mod traits;
pub mod video;

pub use metadata::VideoGeometry;
pub use staging::{StageError, StagedFile, TempStage};
pub use traits::{MediaProber, MediaRemuxer};
pub use video::{classify, classify_file, FfmpegRemuxer, FfprobeProber};
