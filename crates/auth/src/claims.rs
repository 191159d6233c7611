use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use roost_core::UserId;

/// Lifetime of an issued access token, in seconds.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Access-token claims model (transport-agnostic).
///
/// This is the set of claims roost expects once a token has been decoded and
/// its signature verified. Timestamps are seconds since the Unix epoch, the
/// form HS256 tokens carry on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the authenticated user's identifier.
    pub sub: UserId,

    /// Username the token was minted for.
    pub username: String,

    /// Whether the subject holds administration rights.
    pub is_admin: bool,

    /// Issued-at timestamp (Unix seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix seconds).
    pub exp: i64,
}

impl AccessClaims {
    /// Mint claims for a user, valid for [`TOKEN_TTL_SECS`] from `now`.
    pub fn new(
        sub: UserId,
        username: impl Into<String>,
        is_admin: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let iat = now.timestamp();
        Self {
            sub,
            username: username.into(),
            is_admin,
            iat,
            exp: iat + TOKEN_TTL_SECS,
        }
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate token claims.
///
/// Note: this validates the *claims* only. Signature verification/decoding
/// lives in [`crate::token`].
pub fn validate_claims(
    claims: &AccessClaims,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now.timestamp() < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now.timestamp() >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(now: DateTime<Utc>) -> AccessClaims {
        AccessClaims::new(UserId::new(), "alice", false, now)
    }

    #[test]
    fn fresh_claims_validate() {
        let now = Utc::now();
        let claims = sample(now);
        assert_eq!(validate_claims(&claims, now), Ok(()));
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let claims = sample(now);
        let later = now + Duration::seconds(TOKEN_TTL_SECS + 1);
        assert_eq!(
            validate_claims(&claims, later),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let claims = sample(now);
        let at_expiry = claims.expires_at();
        assert_eq!(
            validate_claims(&claims, at_expiry),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn token_from_the_future_is_rejected() {
        let now = Utc::now();
        let claims = sample(now + Duration::minutes(5));
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn inverted_time_window_is_rejected() {
        let now = Utc::now();
        let mut claims = sample(now);
        claims.exp = claims.iat;
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn claims_serialize_with_numeric_timestamps() {
        let claims = sample(Utc::now());
        let value = serde_json::to_value(&claims).unwrap();
        assert!(value["iat"].is_i64());
        assert!(value["exp"].is_i64());
        assert_eq!(value["is_admin"], serde_json::json!(false));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            #[test]
            fn validation_partitions_the_timeline(offset in -120_i64..(2 * TOKEN_TTL_SECS)) {
                let now = Utc::now();
                let claims = sample(now);
                let probe = now + Duration::seconds(offset);
                let expected = if offset < 0 {
                    Err(TokenValidationError::NotYetValid)
                } else if offset >= TOKEN_TTL_SECS {
                    Err(TokenValidationError::Expired)
                } else {
                    Ok(())
                };
                prop_assert_eq!(validate_claims(&claims, probe), expected);
            }
        }
    }
}
