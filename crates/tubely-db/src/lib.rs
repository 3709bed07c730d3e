//! Database repositories for the metadata store.
//!
//! Video records are created by an external collaborator; this crate only reads them and
//! writes back updates from the upload pipeline.

pub mod video;

pub use video::{PgVideoRepository, VideoStore};
