use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use scopegate_core::PrincipalId;

/// Claims the gate reads from a bearer token.
///
/// Signature checks happen before these are trusted; see
/// [`crate::credential::Hs256CredentialExtractor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject. Tokens minted as `{"sub": ...}` are accepted too.
    #[serde(default, alias = "sub", skip_serializing_if = "Option::is_none")]
    pub id: Option<PrincipalId>,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl JwtClaims {
    pub fn new(id: PrincipalId, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: Some(id),
            issued_at,
            expires_at: issued_at + ttl,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the claim time window, tolerating `leeway` of
/// clock skew in both directions.
pub fn validate_claims(
    claims: &JwtClaims,
    now: DateTime<Utc>,
    leeway: Duration,
) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now + leeway < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now - leeway >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
