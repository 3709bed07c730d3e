use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::{multipart_error, parse_video_id};
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use std::sync::Arc;
use tubely_core::constants::VIDEO_UPLOAD_FIELD;
use tubely_core::{AppError, VideoResponse};

/// Upload the video file for an existing record.
///
/// The first part named `video` is streamed straight into the upload pipeline; other parts
/// are skipped.
#[tracing::instrument(
    skip(state, multipart),
    fields(user_id = %user.user_id, video_id = %video_id, operation = "upload_video")
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(VIDEO_UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let body = field.map_err(multipart_error);

        let video = state
            .upload
            .upload(user.user_id, video_id, &content_type, body)
            .await?;

        // The upload is committed at this point; a signing failure only costs the link.
        let response = match state.links.signed_response(video.clone()).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    video_id = %video.id,
                    "Uploaded video stored but playback link could not be signed"
                );
                VideoResponse::from_record(video, None)
            }
        };
        return Ok(Json(response));
    }

    Err(AppError::InvalidInput(format!("Missing '{}' file field", VIDEO_UPLOAD_FIELD)).into())
}
