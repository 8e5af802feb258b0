use std::sync::Arc;

use axum::http::{HeaderMap, header};
use tracing::debug;

use crate::services::auth::identity::{IdentityResolver, RequestIdentity};
use crate::services::auth::token_codec::TokenCodec;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token following `Bearer ` from the Authorization header.
///
/// Missing header, non-ASCII header, other schemes and an empty token all yield `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then_some(token)
}

/// Verifies the bearer token of a request and resolves it into an identity.
///
/// Never fails: any verification or lookup problem leaves the request `Unbound`
/// and the decision is left to the route's policy.
#[derive(Clone, Debug)]
pub struct IdentityBinder {
    codec: Arc<TokenCodec>,
    resolver: IdentityResolver,
}

impl IdentityBinder {
    pub fn new(codec: Arc<TokenCodec>, resolver: IdentityResolver) -> Self {
        Self { codec, resolver }
    }

    pub async fn bind(&self, headers: &HeaderMap) -> RequestIdentity {
        let Some(token) = bearer_token(headers) else {
            return RequestIdentity::Unbound;
        };

        let claims = match self.codec.verify(token) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(error = %err, "bearer token rejected");
                return RequestIdentity::Unbound;
            }
        };

        match self.resolver.resolve(&claims).await {
            Ok(identity) => RequestIdentity::Bound(identity),
            Err(err) => {
                debug!(error = %err, "bearer identity not resolved");
                RequestIdentity::Unbound
            }
        }
    }
}
