//! Video upload pipeline
//!
//! accept → stage → classify → remux → store → reference-record. Each step runs only after
//! the previous one succeeded; nothing is retried and nothing is rolled back.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::Stream;
use tubely_core::constants::ACCEPTED_VIDEO_CONTENT_TYPE;
use tubely_core::{AppError, StorageReference, VideoRecord};
use tubely_db::VideoStore;
use tubely_processing::{classify_file, MediaProber, MediaRemuxer, StageError, TempStage};
use tubely_storage::keys::video_key;
use tubely_storage::Storage;
use uuid::Uuid;

use crate::utils::upload::validate_video_content_type;

/// Orchestrates a single video upload against its collaborators.
#[derive(Clone)]
pub struct VideoUploadService {
    videos: Arc<dyn VideoStore>,
    storage: Arc<dyn Storage>,
    prober: Arc<dyn MediaProber>,
    remuxer: Arc<dyn MediaRemuxer>,
    stage: TempStage,
}

impl VideoUploadService {
    pub fn new(
        videos: Arc<dyn VideoStore>,
        storage: Arc<dyn Storage>,
        prober: Arc<dyn MediaProber>,
        remuxer: Arc<dyn MediaRemuxer>,
        stage: TempStage,
    ) -> Self {
        Self {
            videos,
            storage,
            prober,
            remuxer,
            stage,
        }
    }

    /// Run the upload pipeline for `video_id` on behalf of `user_id`.
    ///
    /// # Arguments
    /// - `content_type`: declared type of the uploaded part; must be `video/mp4`
    /// - `body`: the part's bytes; only read after ownership and type checks pass
    ///
    /// # Returns
    /// The record as stored after its video reference was set.
    ///
    /// Temporary files are owned by this future and removed when it completes or is dropped.
    #[tracing::instrument(skip(self, body), fields(video_id = %video_id, user_id = %user_id))]
    pub async fn upload<S>(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        content_type: &str,
        body: S,
    ) -> Result<VideoRecord, AppError>
    where
        S: Stream<Item = Result<Bytes, AppError>>,
    {
        let start = Instant::now();

        // 1. Authorize against the existing record
        let video = self
            .videos
            .get(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;
        if !video.is_owned_by(user_id) {
            return Err(AppError::Unauthorized(
                "Not authorized to upload this video".to_string(),
            ));
        }

        // 2. Declared type only; the bytes are never sniffed
        validate_video_content_type(content_type)?;

        // 3. Stage the body on disk
        let input = self.stage.materialize(body).await.map_err(|e| match e {
            StageError::Body(err) => err,
            StageError::TooLarge { limit } => AppError::PayloadTooLarge(format!(
                "Upload exceeds the maximum size of {} bytes",
                limit
            )),
            StageError::Io(err) => AppError::Internal(format!("Failed to stage upload: {}", err)),
        })?;

        // 4. Classify and remux
        let classification = classify_file(self.prober.as_ref(), input.path())
            .await
            .map_err(|e| AppError::ProcessingFailed(format!("Couldn't classify video: {:#}", e)))?;

        let output = self
            .stage
            .reserve()
            .map_err(|e| AppError::Internal(format!("Failed to reserve remux output: {}", e)))?;
        self.remuxer
            .remux(input.path(), output.path())
            .await
            .map_err(|e| AppError::ProcessingFailed(format!("Couldn't process video: {:#}", e)))?;
        drop(input);

        // 5. Store, then point the record at the object
        let reference = StorageReference::new(
            self.storage.default_bucket(),
            video_key(classification, video_id),
        );
        let size = self
            .storage
            .put_file(&reference, output.path(), ACCEPTED_VIDEO_CONTENT_TYPE)
            .await
            .map_err(|e| AppError::StorageFailed(format!("Couldn't upload video: {}", e)))?;
        drop(output);

        let updated = match self.videos.set_video_reference(video_id, &reference).await {
            Ok(updated) => updated,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    video_id = %video_id,
                    bucket = %reference.bucket,
                    key = %reference.key,
                    "Video object stored but record update failed"
                );
                return Err(AppError::OrphanedObject {
                    bucket: reference.bucket,
                    key: reference.key,
                    message: e.to_string(),
                });
            }
        };

        tracing::info!(
            video_id = %video_id,
            classification = %classification,
            bucket = %reference.bucket,
            key = %reference.key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video uploaded"
        );

        Ok(updated)
    }
}
