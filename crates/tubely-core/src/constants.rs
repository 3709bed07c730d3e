//! Pipeline-wide constants.

use std::time::Duration;

/// Largest request body accepted by the upload route (1 GiB).
pub const MAX_UPLOAD_SIZE_BYTES: u64 = 1 << 30;

/// The only container type the upload pipeline accepts.
pub const ACCEPTED_VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Multipart part name carrying the video bytes.
pub const VIDEO_UPLOAD_FIELD: &str = "video";

/// Lifetime of a signed playback link.
pub const SIGNED_URL_EXPIRY: Duration = Duration::from_secs(10 * 60);

/// Issuer claim expected on access tokens.
pub const JWT_ISSUER: &str = "tubely-access";

/// Separator between bucket and key in a persisted storage reference.
pub const STORAGE_REFERENCE_DELIMITER: char = ',';
