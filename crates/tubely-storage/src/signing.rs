//! Signed query parameters for local-storage playback links.
//!
//! Message: `{bucket}\n{key}\n{expires}`.
//! Signature = base64url(HMAC-SHA256(secret, message)).

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::traits::{StorageError, StorageResult};

type HmacSha256 = Hmac<Sha256>;

/// Unix timestamp `expires_in` from now.
pub fn expiry_from_now(expires_in: Duration) -> u64 {
    SystemTime::now()
        .checked_add(expires_in)
        .unwrap_or(UNIX_EPOCH)
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

pub fn sign(secret: &[u8], bucket: &str, key: &str, expires: u64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key size");
    mac.update(message(bucket, key, expires).as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

/// Check the signature in constant time, then the expiry.
pub fn verify(
    secret: &[u8],
    bucket: &str,
    key: &str,
    expires: u64,
    signature: &str,
) -> StorageResult<()> {
    let tag = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| StorageError::InvalidSignature("malformed signature".to_string()))?;

    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key size");
    mac.update(message(bucket, key, expires).as_bytes());
    mac.verify_slice(&tag)
        .map_err(|_| StorageError::InvalidSignature("signature mismatch".to_string()))?;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    if now > expires {
        return Err(StorageError::InvalidSignature("link has expired".to_string()));
    }

    Ok(())
}

fn message(bucket: &str, key: &str, expires: u64) -> String {
    format!("{}\n{}\n{}", bucket, key, expires)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_signature_verifies() {
        let expires = expiry_from_now(Duration::from_secs(600));
        let sig = sign(SECRET, "tubely", "landscape/a.mp4", expires);
        assert!(verify(SECRET, "tubely", "landscape/a.mp4", expires, &sig).is_ok());
    }

    #[test]
    fn test_signature_bound_to_key_and_expiry() {
        let expires = expiry_from_now(Duration::from_secs(600));
        let sig = sign(SECRET, "tubely", "landscape/a.mp4", expires);
        assert!(verify(SECRET, "tubely", "portrait/a.mp4", expires, &sig).is_err());
        assert!(verify(SECRET, "tubely", "landscape/a.mp4", expires + 1, &sig).is_err());
        assert!(verify(b"another-secret", "tubely", "landscape/a.mp4", expires, &sig).is_err());
    }

    #[test]
    fn test_expired_link_rejected() {
        let expires = 1_000;
        let sig = sign(SECRET, "tubely", "other/a.mp4", expires);
        let err = verify(SECRET, "tubely", "other/a.mp4", expires, &sig).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }
}
