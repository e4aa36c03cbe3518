//! Bearer credential extraction and validation.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use http::{HeaderMap, header::AUTHORIZATION};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use thiserror::Error;

use scopegate_core::PrincipalId;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("malformed authorization header: {0}")]
    MalformedHeader(&'static str),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("invalid token signature")]
    InvalidSignature,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("token did not contain a subject")]
    MissingSubject,
}

/// Pulls the caller's credential out of a request and resolves it to a subject.
///
/// - `Ok(None)`: the request carries no credential at all.
/// - `Err(_)`: a credential is present but unusable. Callers must not treat
///   this as anonymous.
#[async_trait]
pub trait CredentialExtractor: Send + Sync {
    async fn extract(&self, headers: &HeaderMap) -> Result<Option<PrincipalId>, CredentialError>;
}

/// Read the bearer token from the `Authorization` header.
///
/// The value must be exactly `<scheme> <token>` with a case-insensitive
/// `Bearer` scheme.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, CredentialError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| CredentialError::MalformedHeader("header is not valid ASCII"))?;

    let mut parts = value.split(' ');
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CredentialError::MalformedHeader(
            "expected 'Bearer <token>'",
        ));
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(CredentialError::MalformedHeader("unsupported scheme"));
    }
    if token.is_empty() {
        return Err(CredentialError::MalformedHeader("empty token"));
    }

    Ok(Some(token))
}

/// HS256 bearer token validator.
///
/// Validation only: this type cannot mint tokens.
pub struct Hs256CredentialExtractor {
    key: DecodingKey,
    validation: Validation,
    leeway: Duration,
}

impl Hs256CredentialExtractor {
    pub const DEFAULT_LEEWAY_SECS: u64 = 30;
    /// Larger leeways are clamped to one day.
    pub const MAX_LEEWAY_SECS: u64 = 24 * 60 * 60;

    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self::with_leeway(secret, Self::DEFAULT_LEEWAY_SECS)
    }

    pub fn with_leeway(secret: impl AsRef<[u8]>, leeway_secs: u64) -> Self {
        let leeway_secs = leeway_secs.min(Self::MAX_LEEWAY_SECS);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
            leeway: i64::try_from(leeway_secs)
                .map(Duration::seconds)
                .unwrap_or(Duration::days(1)),
        }
    }

    /// Verify signature and time window, then return the subject.
    pub fn validate_token(&self, token: &str) -> Result<PrincipalId, CredentialError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenValidationError::Expired.into(),
                ErrorKind::ImmatureSignature => TokenValidationError::NotYetValid.into(),
                ErrorKind::InvalidSignature => CredentialError::InvalidSignature,
                _ => CredentialError::InvalidToken(e.to_string()),
            })?;

        validate_claims(&data.claims, Utc::now(), self.leeway)?;

        data.claims.id.ok_or(CredentialError::MissingSubject)
    }
}

impl core::fmt::Debug for Hs256CredentialExtractor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256CredentialExtractor")
            .field("key", &"<REDACTED>")
            .field("leeway", &self.leeway)
            .finish()
    }
}

#[async_trait]
impl CredentialExtractor for Hs256CredentialExtractor {
    async fn extract(&self, headers: &HeaderMap) -> Result<Option<PrincipalId>, CredentialError> {
        match bearer_token(headers)? {
            Some(token) => self.validate_token(token).map(Some),
            None => Ok(None),
        }
    }
}
