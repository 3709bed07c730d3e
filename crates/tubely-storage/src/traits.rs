//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::{StorageBackend, StorageReference};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait so the upload pipeline
/// and the link signer never depend on a concrete backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload the complete contents of a local file as one object, overwriting any object
    /// already stored under `reference`. Returns the number of bytes written.
    ///
    /// A failed upload leaves no partial object visible under `reference`.
    async fn put_file(
        &self,
        reference: &StorageReference,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<u64>;

    /// Generate a presigned/temporary URL for direct access (GET)
    ///
    /// The URL retrieves the object without further authentication until `expires_in`
    /// has elapsed.
    async fn presigned_get_url(
        &self,
        reference: &StorageReference,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Bucket new uploads are placed in.
    fn default_bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
