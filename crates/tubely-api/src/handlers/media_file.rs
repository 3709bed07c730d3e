//! Serves objects of the local storage backend through their signed links.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderValue},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tubely_core::constants::ACCEPTED_VIDEO_CONTENT_TYPE;
use tubely_core::{AppError, StorageReference};

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub expires: u64,
    pub signature: String,
}

pub async fn serve_media(
    State(state): State<Arc<AppState>>,
    Path((bucket, key)): Path<(String, String)>,
    Query(query): Query<SignedQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let storage = state
        .local_media
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Media route is not enabled".to_string()))?;

    let reference = StorageReference::new(bucket, key);
    storage.verify_signed_request(&reference, query.expires, &query.signature)?;

    let (file, len) = storage.open(&reference).await?;
    tracing::debug!(
        bucket = %reference.bucket,
        key = %reference.key,
        size_bytes = len,
        "Serving signed media"
    );

    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static(ACCEPTED_VIDEO_CONTENT_TYPE),
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(len)),
        (header::CACHE_CONTROL, HeaderValue::from_static("private, no-store")),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))))
}
