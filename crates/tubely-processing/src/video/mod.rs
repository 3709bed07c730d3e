//! Video geometry probing, classification and fast-start remuxing.

pub mod classify;
pub mod probe;
pub mod remux;

pub use classify::{classify, classify_file};
pub use probe::FfprobeProber;
pub use remux::FfmpegRemuxer;
