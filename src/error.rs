/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON `{ "message": ... }` body)
 * - repo error / guard の拒否を統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::policy::AuthzError;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";
pub const FORBIDDEN_MESSAGE: &str = "Forbidden";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("request timed out")]
    RequestTimeout,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // 401/403 の本文は固定文言のみ (identity に関する情報は返さない)
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { resource } => {
                (StatusCode::NOT_FOUND, format!("{resource} not found."))
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE.into()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, FORBIDDEN_MESSAGE.into()),
            AppError::RequestTimeout => (StatusCode::REQUEST_TIMEOUT, "request timed out".into()),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".into(),
            ),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        tracing::error!(error = ?e, "repository failure");
        AppError::Internal
    }
}

impl From<AuthzError> for AppError {
    fn from(e: AuthzError) -> Self {
        match e {
            AuthzError::Unauthenticated => AppError::Unauthorized,
            AuthzError::Forbidden => AppError::Forbidden,
        }
    }
}
