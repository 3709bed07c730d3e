//! Shared key generation for storage backends.

use tubely_core::Classification;
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

/// Storage key for an uploaded video: `{classification}/{video_id}.mp4`.
///
/// Deterministic in the record identity, so a re-upload overwrites the previous object.
pub fn video_key(classification: Classification, video_id: Uuid) -> String {
    format!("{}/{}.mp4", classification.as_str(), video_id)
}

/// Reject keys that could escape a backend's namespace.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|segment| segment.is_empty() || segment == "..")
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Bucket names become a single path segment on local storage and one half of the
/// persisted reference, so they may contain neither `/` nor `,`.
pub fn validate_bucket(bucket: &str) -> StorageResult<()> {
    if bucket.is_empty() || bucket == ".." || bucket.contains(['/', '\\', ',']) {
        return Err(StorageError::InvalidKey(format!("bucket {:?}", bucket)));
    }
    Ok(())
}
