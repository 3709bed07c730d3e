//! In-memory and failure-injecting collaborators.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tubely_core::{AppError, StorageBackend, StorageReference, VideoRecord};
use tubely_db::VideoStore;
use tubely_processing::{MediaProber, MediaRemuxer, VideoGeometry};
use tubely_storage::{Storage, StorageError, StorageResult};
use uuid::Uuid;

/// Bytes the stub remuxer prepends, so tests can tell remuxed output from the upload.
pub const REMUX_MARKER: &[u8] = b"moov:";

#[derive(Default)]
pub struct InMemoryVideoStore {
    videos: Mutex<HashMap<Uuid, VideoRecord>>,
    fail_updates: AtomicBool,
}

impl InMemoryVideoStore {
    pub fn insert(&self, video: VideoRecord) {
        self.videos.lock().unwrap().insert(video.id, video);
    }

    pub fn snapshot(&self, id: Uuid) -> Option<VideoRecord> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    /// Edit the thumbnail the way another writer would, outside the upload path.
    pub fn set_thumbnail(&self, id: Uuid, url: &str) {
        if let Some(video) = self.videos.lock().unwrap().get_mut(&id) {
            video.thumbnail_url = Some(url.to_string());
            video.updated_at = Utc::now();
        }
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn get(&self, video_id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        Ok(self.snapshot(video_id))
    }

    async fn set_video_reference(
        &self,
        video_id: Uuid,
        reference: &StorageReference,
    ) -> Result<VideoRecord, AppError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Internal("metadata store unavailable".to_string()));
        }
        let mut videos = self.videos.lock().unwrap();
        let stored = videos
            .get_mut(&video_id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;
        stored.video_url = Some(reference.to_string());
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }
}

pub struct StaticProber(pub VideoGeometry);

#[async_trait]
impl MediaProber for StaticProber {
    async fn probe(&self, path: &Path) -> anyhow::Result<VideoGeometry> {
        anyhow::ensure!(path.exists(), "probe input missing: {}", path.display());
        Ok(self.0.clone())
    }
}

pub struct FailingProber;

#[async_trait]
impl MediaProber for FailingProber {
    async fn probe(&self, _path: &Path) -> anyhow::Result<VideoGeometry> {
        anyhow::bail!("ffprobe exited with status 1: Invalid data found when processing input")
    }
}

/// Writes the marker followed by the input bytes.
pub struct CopyRemuxer;

#[async_trait]
impl MediaRemuxer for CopyRemuxer {
    async fn remux(&self, input: &Path, output: &Path) -> anyhow::Result<()> {
        let mut bytes = REMUX_MARKER.to_vec();
        bytes.extend(tokio::fs::read(input).await?);
        tokio::fs::write(output, bytes).await?;
        Ok(())
    }
}

/// Copies like [`CopyRemuxer`] but edits the record's thumbnail mid-remux, standing in
/// for a second writer that commits while the upload is still processing.
pub struct ConcurrentEditRemuxer {
    pub videos: Arc<InMemoryVideoStore>,
    pub video_id: Uuid,
    pub thumbnail_url: String,
}

#[async_trait]
impl MediaRemuxer for ConcurrentEditRemuxer {
    async fn remux(&self, input: &Path, output: &Path) -> anyhow::Result<()> {
        self.videos.set_thumbnail(self.video_id, &self.thumbnail_url);
        CopyRemuxer.remux(input, output).await
    }
}

pub struct FailingRemuxer;

#[async_trait]
impl MediaRemuxer for FailingRemuxer {
    async fn remux(&self, _input: &Path, _output: &Path) -> anyhow::Result<()> {
        anyhow::bail!("ffmpeg exited with status 1: moov atom not found")
    }
}

/// Rejects every write and signing request.
pub struct FailingStorage;

#[async_trait]
impl Storage for FailingStorage {
    async fn put_file(
        &self,
        _reference: &StorageReference,
        _path: &Path,
        _content_type: &str,
    ) -> StorageResult<u64> {
        Err(StorageError::UploadFailed("AccessDenied".to_string()))
    }

    async fn presigned_get_url(
        &self,
        _reference: &StorageReference,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Err(StorageError::BackendError("signer unavailable".to_string()))
    }

    fn default_bucket(&self) -> &str {
        "tubely"
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Stores through `inner` but cannot sign links.
pub struct UnsignableStorage {
    pub inner: Arc<dyn Storage>,
}

impl UnsignableStorage {
    pub fn wrap(inner: Arc<dyn Storage>) -> Arc<dyn Storage> {
        Arc::new(Self { inner })
    }
}

#[async_trait]
impl Storage for UnsignableStorage {
    async fn put_file(
        &self,
        reference: &StorageReference,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<u64> {
        self.inner.put_file(reference, path, content_type).await
    }

    async fn presigned_get_url(
        &self,
        _reference: &StorageReference,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Err(StorageError::BackendError("credentials expired".to_string()))
    }

    fn default_bucket(&self) -> &str {
        self.inner.default_bucket()
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}
