use crate::traits::{Storage, StorageError, StorageResult};
use crate::{keys, signing};
use crate::{StorageBackend, StorageReference};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs;
use uuid::Uuid;

/// Local filesystem storage implementation
///
/// Objects live at `{base_path}/{bucket}/{key}`. Playback links point at `base_url` and
/// carry an HMAC signature with an expiry, checked by [`LocalStorage::verify_signed_request`].
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    bucket: String,
    signing_secret: Vec<u8>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/tubely/media")
    /// * `base_url` - Base URL of the media route (e.g., "http://localhost:8091/media")
    /// * `bucket` - Bucket new uploads are placed in
    /// * `signing_secret` - Key for playback link signatures
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        bucket: String,
        signing_secret: impl Into<Vec<u8>>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();
        keys::validate_bucket(&bucket)?;

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
            bucket,
            signing_secret: signing_secret.into(),
        })
    }

    /// Filesystem path of an object. Bucket and key are validated so the result always
    /// stays under `base_path`.
    fn object_path(&self, reference: &StorageReference) -> StorageResult<PathBuf> {
        keys::validate_bucket(&reference.bucket)?;
        keys::validate_key(&reference.key)?;
        Ok(self.base_path.join(&reference.bucket).join(&reference.key))
    }

    fn generate_url(&self, reference: &StorageReference, expires: u64, signature: &str) -> String {
        let key = reference
            .key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}/{}?expires={}&signature={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&reference.bucket),
            key,
            expires,
            signature
        )
    }

    /// Check a playback link's signature and expiry.
    pub fn verify_signed_request(
        &self,
        reference: &StorageReference,
        expires: u64,
        signature: &str,
    ) -> StorageResult<()> {
        signing::verify(
            &self.signing_secret,
            &reference.bucket,
            &reference.key,
            expires,
            signature,
        )
    }

    /// Open a stored object for reading, returning the file and its length.
    pub async fn open(&self, reference: &StorageReference) -> StorageResult<(fs::File, u64)> {
        let path = self.object_path(reference)?;
        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(reference.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let len = file.metadata().await?.len();
        Ok((file, len))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put_file(
        &self,
        reference: &StorageReference,
        path: &Path,
        _content_type: &str,
    ) -> StorageResult<u64> {
        let target = self.object_path(reference)?;
        let parent = target
            .parent()
            .ok_or_else(|| StorageError::InvalidKey(reference.key.clone()))?;
        fs::create_dir_all(parent).await?;

        let start = Instant::now();

        // Copy next to the target, then rename over it so readers never see a partial object.
        let partial = parent.join(format!(".{}.partial", Uuid::new_v4()));
        let written = match copy_and_sync(path, &partial).await {
            Ok(size) => size,
            Err(e) => {
                let _ = fs::remove_file(&partial).await;
                tracing::error!(
                    error = %e,
                    bucket = %reference.bucket,
                    key = %reference.key,
                    "Local storage upload failed"
                );
                return Err(StorageError::UploadFailed(format!(
                    "Failed to write {}: {}",
                    target.display(),
                    e
                )));
            }
        };

        if let Err(e) = fs::rename(&partial, &target).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to move object into place at {}: {}",
                target.display(),
                e
            )));
        }

        tracing::info!(
            path = %target.display(),
            bucket = %reference.bucket,
            key = %reference.key,
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(written)
    }

    async fn presigned_get_url(
        &self,
        reference: &StorageReference,
        expires_in: Duration,
    ) -> StorageResult<String> {
        keys::validate_bucket(&reference.bucket)?;
        keys::validate_key(&reference.key)?;

        let expires = signing::expiry_from_now(expires_in);
        let signature = signing::sign(
            &self.signing_secret,
            &reference.bucket,
            &reference.key,
            expires,
        );
        Ok(self.generate_url(reference, expires, &signature))
    }

    fn default_bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

async fn copy_and_sync(from: &Path, to: &Path) -> std::io::Result<u64> {
    let written = fs::copy(from, to).await?;
    fs::File::open(to).await?.sync_all().await?;
    Ok(written)
}
