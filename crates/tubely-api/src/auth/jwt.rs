//! HS256 access tokens.
//!
//! Tokens carry the issuer `tubely-access` and the user ID as `sub`.

use crate::auth::models::AccessClaims;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;
use tubely_core::constants::JWT_ISSUER;
use tubely_core::AppError;
use uuid::Uuid;

/// Validates access tokens signed with the shared secret.
#[derive(Clone)]
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[JWT_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate a token and return the authenticated user ID.
    pub fn validate(&self, token: &str) -> Result<Uuid, AppError> {
        let token_data =
            decode::<AccessClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::Unauthorized("Token has expired".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                        AppError::Unauthorized("Invalid token issuer".to_string())
                    }
                    _ => AppError::Unauthorized(format!("Invalid or expired token: {}", e)),
                }
            })?;

        Uuid::parse_str(&token_data.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
    }
}

/// Issue an access token for `user_id`, valid for `expires_in`.
pub fn issue_access_token(
    user_id: Uuid,
    secret: &str,
    expires_in: Duration,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let claims = AccessClaims {
        iss: JWT_ISSUER.to_string(),
        sub: user_id.to_string(),
        iat: now,
        exp: now + expires_in.as_secs() as i64,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-jwt-secret-at-least-32-characters";

    #[test]
    fn test_round_trip_returns_user_id() {
        let user_id = Uuid::new_v4();
        let token = issue_access_token(user_id, SECRET, Duration::from_secs(3600)).unwrap();
        assert_eq!(JwtValidator::new(SECRET).validate(&token).unwrap(), user_id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, Duration::from_secs(3600)).unwrap();
        let err = JwtValidator::new("another-secret-that-is-32-chars-long!")
            .validate(&token)
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            iss: JWT_ISSUER.to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = JwtValidator::new(SECRET).validate(&token).unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: Token has expired");
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            iss: "someone-else".to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = JwtValidator::new(SECRET).validate(&token).unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: Invalid token issuer");
    }
}
