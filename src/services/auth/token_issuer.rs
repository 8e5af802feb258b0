use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::SigningSecret;

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("failed to sign token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
    #[error("token lifetime of {ttl_seconds}s is out of range")]
    LifetimeOutOfRange { ttl_seconds: u64 },
}

/// Claims written into an issued token.
///
/// Subject and role use the short claim names; `extra` is flattened into the payload.
#[derive(Debug, Clone, Serialize)]
pub struct IssueClaims {
    nameid: String,
    role: String,
    exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aud: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl IssueClaims {
    pub fn new(subject_id: i64, role: impl Into<String>, expires_at: i64) -> Self {
        Self {
            nameid: subject_id.to_string(),
            role: role.into(),
            exp: expires_at,
            iat: None,
            iss: None,
            aud: None,
            extra: Map::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Signs HS256 access tokens with the process-wide secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    issuer: Option<String>,
    audience: Option<String>,
    ttl_seconds: u64,
}

impl TokenIssuer {
    pub fn new(
        secret: &SigningSecret,
        issuer: Option<String>,
        audience: Option<String>,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl_seconds,
        }
    }

    pub fn issue(&self, subject_id: i64, role: &str) -> Result<String, IssueError> {
        self.issue_at(subject_id, role, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject_id: i64,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<String, IssueError> {
        self.sign(&self.claims_at(subject_id, role, now)?)
    }

    /// Claims for a token issued at `now` that lives for the configured TTL.
    pub fn claims_at(
        &self,
        subject_id: i64,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<IssueClaims, IssueError> {
        let exp = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| now.timestamp().checked_add(ttl))
            .ok_or(IssueError::LifetimeOutOfRange {
                ttl_seconds: self.ttl_seconds,
            })?;

        let mut claims = IssueClaims::new(subject_id, role, exp);
        claims.iat = Some(now.timestamp());
        Ok(claims)
    }

    /// Sign `claims` as-is, filling in the configured issuer/audience if unset.
    pub fn sign(&self, claims: &IssueClaims) -> Result<String, IssueError> {
        let mut claims = claims.clone();
        if claims.iss.is_none() {
            claims.iss = self.issuer.clone();
        }
        if claims.aud.is_none() {
            claims.aud = self.audience.clone();
        }

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        Ok(jsonwebtoken::encode(&header, &claims, &self.encoding_key)?)
    }
}
