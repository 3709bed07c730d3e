//! Read-time expansion of stored references into playable links.

use std::sync::Arc;

use tubely_core::constants::SIGNED_URL_EXPIRY;
use tubely_core::{AppError, StorageReference, VideoRecord, VideoResponse};
use tubely_storage::Storage;

/// Signs playback links. Links are never cached or persisted.
#[derive(Clone)]
pub struct LinkSigner {
    storage: Arc<dyn Storage>,
}

impl LinkSigner {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// A URL for `reference`, valid for ten minutes from now.
    pub async fn sign(&self, reference: &StorageReference) -> Result<String, AppError> {
        self.storage
            .presigned_get_url(reference, SIGNED_URL_EXPIRY)
            .await
            .map_err(|e| {
                AppError::ProcessingFailed(format!("Couldn't generate presigned URL: {}", e))
            })
    }

    /// Client view of `video` with a fresh link in place of the stored reference.
    pub async fn signed_response(&self, video: VideoRecord) -> Result<VideoResponse, AppError> {
        let signed_url = match video.video_reference()? {
            Some(reference) => Some(self.sign(&reference).await?),
            None => None,
        };
        Ok(VideoResponse::from_record(video, signed_url))
    }
}
