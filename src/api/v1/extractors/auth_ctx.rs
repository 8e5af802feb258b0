/*
 * Responsibility
 * - Handler から見える「認証済み identity」の extractor
 * - binder が RequestIdentity を extensions に格納済みである前提
 * - Unbound / 未設定なら 401 (guard を通った route では起きない)
 */
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::{RequestIdentity, ResolvedIdentity};

pub struct CurrentIdentity(pub ResolvedIdentity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestIdentity>()
            .and_then(RequestIdentity::identity)
            .cloned()
            .map(CurrentIdentity)
            .ok_or(AppError::Unauthorized)
    }
}
