//! Domain models shared across crates.

pub mod storage;
pub mod video;

pub use storage::StorageReference;
pub use video::{Classification, VideoRecord, VideoResponse};
