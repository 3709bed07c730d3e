//! Tubely Storage Library
//!
//! Storage abstraction for uploaded videos, with an S3 (or S3-compatible) backend and a
//! local filesystem backend.
//!
//! # Storage key format
//!
//! Every backend addresses objects by a [`StorageReference`] (`bucket` + `key`). Video keys
//! are `{classification}/{video_id}.mp4`; key generation lives in the [`keys`] module so
//! the layout is defined once.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
#[cfg(feature = "storage-local")]
pub mod signing;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use factory::create_local_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::{StorageBackend, StorageReference};
