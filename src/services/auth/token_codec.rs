use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::SigningSecret;
use crate::services::auth::claims::ClaimSet;

/// Why a bearer token was not accepted.
///
/// None of these reach the client; the binder treats every variant as "no identity".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("malformed token")]
    MalformedToken,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("rejected '{0}' claim")]
    ClaimRejected(&'static str),
}

impl From<jsonwebtoken::errors::Error> for VerificationError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            // only HS256 is accepted, a different alg can't have been signed with our key
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidIssuer => Self::ClaimRejected("iss"),
            ErrorKind::InvalidAudience => Self::ClaimRejected("aud"),
            _ => Self::MalformedToken,
        }
    }
}

/// HS256 bearer-token verifier.
///
/// - Key material is not printable via Debug.
/// - `exp` is checked here rather than by jsonwebtoken so that a token is
///   already expired at the exact second it names (no leeway).
#[derive(Clone)]
pub struct TokenCodec {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &SigningSecret, issuer: Option<&str>, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_nbf = false;

        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<ClaimSet, VerificationError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature and expiry against `now`.
    ///
    /// jsonwebtoken checks the signature (and iss/aud when configured) before the
    /// payload is handed back, so expiry is only read from authenticated claims.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<ClaimSet, VerificationError> {
        if token.trim().is_empty() {
            return Err(VerificationError::MalformedToken);
        }

        let data = jsonwebtoken::decode::<Map<String, Value>>(
            token,
            &self.decoding_key,
            &self.validation,
        )?;
        let claims = data.claims;

        let expires_at = claims
            .get("exp")
            .and_then(Value::as_i64)
            .ok_or(VerificationError::MalformedToken)?;

        if expires_at <= now.timestamp() {
            return Err(VerificationError::Expired);
        }

        Ok(ClaimSet::new(claims))
    }
}
