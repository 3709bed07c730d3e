use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use tubely_core::constants::ACCEPTED_VIDEO_CONTENT_TYPE;
use tubely_core::AppError;
use uuid::Uuid;

/// Strip MIME parameters (`; codecs=...`) and surrounding whitespace.
pub fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .unwrap_or(content_type)
}

/// Accept exactly `video/mp4`, ignoring case and parameters.
pub fn validate_video_content_type(content_type: &str) -> Result<(), AppError> {
    let normalized = normalize_mime_type(content_type).to_lowercase();
    if normalized != ACCEPTED_VIDEO_CONTENT_TYPE {
        return Err(AppError::InvalidInput(format!(
            "Invalid file type '{}'. Only {} is allowed",
            normalized, ACCEPTED_VIDEO_CONTENT_TYPE
        )));
    }
    Ok(())
}

pub fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput("Invalid video ID".to_string()))
}

/// Map a multipart read failure; body-limit rejections surface as 413.
pub fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}
