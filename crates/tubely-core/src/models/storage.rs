//! Storage reference model: backend-agnostic pointer to where a video object lives.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::STORAGE_REFERENCE_DELIMITER;
use crate::error::AppError;

/// A `(bucket, key)` pair identifying one stored object.
///
/// This is never a fetchable URL; the link signer expands it at read time. Its persisted
/// form is `"{bucket},{key}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageReference {
    pub bucket: String,
    pub key: String,
}

impl StorageReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl Display for StorageReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}{}", self.bucket, STORAGE_REFERENCE_DELIMITER, self.key)
    }
}

impl FromStr for StorageReference {
    type Err = AppError;

    /// Decode the persisted form. Anything other than exactly two non-empty components is
    /// malformed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(STORAGE_REFERENCE_DELIMITER).collect();
        match parts.as_slice() {
            [bucket, key] if !bucket.is_empty() && !key.is_empty() => {
                Ok(StorageReference::new(*bucket, *key))
            }
            _ => Err(AppError::ProcessingFailed(format!(
                "Malformed video reference: {:?}",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_form_uses_comma() {
        let reference = StorageReference::new("tubely-videos", "portrait/abc.mp4");
        assert_eq!(reference.to_string(), "tubely-videos,portrait/abc.mp4");
    }

    #[test]
    fn test_parse_round_trip() {
        let parsed: StorageReference = "tubely-videos,landscape/abc.mp4".parse().unwrap();
        assert_eq!(parsed.bucket, "tubely-videos");
        assert_eq!(parsed.key, "landscape/abc.mp4");
    }

    #[test]
    fn test_rejects_malformed_references() {
        for raw in [
            "",
            "tubely-videos",
            ",landscape/abc.mp4",
            "tubely-videos,",
            "a,b,c",
            "https://tubely-videos.s3.amazonaws.com/landscape/abc.mp4",
        ] {
            let err = raw.parse::<StorageReference>().unwrap_err();
            assert!(
                matches!(err, AppError::ProcessingFailed(_)),
                "expected ProcessingFailed for {:?}",
                raw
            );
        }
    }
}
