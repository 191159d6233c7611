//! Signed access tokens (HS256).

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{AccessClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to encode token: {0}")]
    Encode(String),

    /// Undecodable token: bad structure, bad signature, wrong algorithm.
    #[error("invalid token: {0}")]
    Invalid(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Token issue/verify seam consumed by the HTTP layer.
pub trait TokenCodec: Send + Sync {
    fn issue(&self, claims: &AccessClaims) -> Result<String, TokenError>;

    /// Verify signature and claims against the caller-supplied clock.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, TokenError>;
}

/// HMAC-SHA256 codec over a shared secret.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl TokenCodec for Hs256TokenCodec {
    fn issue(&self, claims: &AccessClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // The time window is checked by `validate_claims` against the
        // caller's clock, not the library's.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use roost_core::UserId;

    fn codec() -> Hs256TokenCodec {
        Hs256TokenCodec::new(b"test-secret")
    }

    #[test]
    fn issue_then_verify_round_trips() {
        let codec = codec();
        let now = Utc::now();
        let claims = AccessClaims::new(UserId::new(), "admin", true, now);

        let token = codec.issue(&claims).unwrap();
        let verified = codec.verify(&token, now).unwrap();
        assert_eq!(verified, claims);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = Utc::now();
        let claims = AccessClaims::new(UserId::new(), "admin", true, now);
        let token = codec().issue(&claims).unwrap();

        let other = Hs256TokenCodec::new(b"another-secret");
        let err = other.verify(&token, now).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let now = Utc::now();
        let claims = AccessClaims::new(UserId::new(), "user", false, now);
        let token = codec().issue(&claims).unwrap();

        // Swap the payload segment for one claiming admin rights.
        let forged_claims = AccessClaims {
            is_admin: true,
            ..claims
        };
        let forged = codec().issue(&forged_claims).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload: Vec<&str> = forged.split('.').collect();
        parts[1] = forged_payload[1];
        let spliced = parts.join(".");

        let err = codec().verify(&spliced, now).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn expired_token_fails_claims_validation() {
        let codec = codec();
        let issued = Utc::now() - Duration::hours(3);
        let claims = AccessClaims::new(UserId::new(), "admin", true, issued);
        let token = codec.issue(&claims).unwrap();

        let err = codec.verify(&token, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            TokenError::Claims(TokenValidationError::Expired)
        ));
    }

    #[test]
    fn garbage_token_is_invalid() {
        let err = codec().verify("definitely.not.a-token", Utc::now()).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }
}
