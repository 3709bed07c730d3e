//! Service and repository wiring

use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use tubely_core::constants::MAX_UPLOAD_SIZE_BYTES;
use tubely_core::Config;
use tubely_db::{PgVideoRepository, VideoStore};
use tubely_processing::{FfmpegRemuxer, FfprobeProber, MediaProber, MediaRemuxer, TempStage};

use super::storage::StorageSetup;
use crate::services::{LinkSigner, VideoUploadService};
use crate::state::AppState;

pub async fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: StorageSetup,
) -> Result<Arc<AppState>> {
    let videos: Arc<dyn VideoStore> = Arc::new(PgVideoRepository::new(pool));

    let prober: Arc<dyn MediaProber> = Arc::new(
        FfprobeProber::new(config.ffprobe_path.clone()).context("Invalid FFPROBE_PATH")?,
    );
    let remuxer: Arc<dyn MediaRemuxer> = Arc::new(
        FfmpegRemuxer::new(config.ffmpeg_path.clone()).context("Invalid FFMPEG_PATH")?,
    );

    tokio::fs::create_dir_all(&config.upload_temp_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create upload temp dir {}",
                config.upload_temp_dir.display()
            )
        })?;
    let stage = TempStage::new(config.upload_temp_dir.clone(), MAX_UPLOAD_SIZE_BYTES);
    tracing::info!(
        temp_dir = %config.upload_temp_dir.display(),
        ffprobe = %config.ffprobe_path,
        ffmpeg = %config.ffmpeg_path,
        "Upload pipeline configured"
    );

    let backend = storage.storage.backend_type();
    let upload = VideoUploadService::new(
        videos.clone(),
        storage.storage.clone(),
        prober,
        remuxer,
        stage,
    );
    let links = LinkSigner::new(storage.storage);

    Ok(Arc::new(AppState::new(
        videos,
        upload,
        links,
        storage.local_media,
        backend,
    )))
}
