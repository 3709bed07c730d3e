//! Video record repository: reads and updates rows of the `videos` table.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tubely_core::{AppError, StorageReference, VideoRecord};
use uuid::Uuid;

/// Metadata store contract used by the upload pipeline and the read path.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Fetch a record; `None` when it does not exist.
    async fn get(&self, video_id: Uuid) -> Result<Option<VideoRecord>, AppError>;

    /// Point the record at a stored object and return the record as stored.
    ///
    /// Only the reference field (and `updated_at`) is written; edits other writers made to
    /// the record in the meantime are kept.
    async fn set_video_reference(
        &self,
        video_id: Uuid,
        reference: &StorageReference,
    ) -> Result<VideoRecord, AppError>;
}

/// PostgreSQL implementation of [`VideoStore`].
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoStore for PgVideoRepository {
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.record_id = %video_id))]
    async fn get(&self, video_id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRecord>(
            r#"
            SELECT id, user_id, title, description, thumbnail_url, video_url,
                   created_at, updated_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    #[tracing::instrument(
        skip(self, reference),
        fields(
            db.table = "videos",
            db.record_id = %video_id,
            bucket = %reference.bucket,
            key = %reference.key
        )
    )]
    async fn set_video_reference(
        &self,
        video_id: Uuid,
        reference: &StorageReference,
    ) -> Result<VideoRecord, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRecord>(
            r#"
            UPDATE videos
            SET video_url = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, description, thumbnail_url, video_url,
                      created_at, updated_at
            "#,
        )
        .bind(video_id)
        .bind(reference.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))
    }
}
