/*
 * Responsibility
 * - GET /time (Public)
 * - SPA の時刻合わせ用: サーバ時刻と、`at` を UTC に正規化した値を返す
 */
use axum::{
    Json,
    extract::{Query, rejection::QueryRejection},
};
use chrono::Utc;

use crate::api::v1::dto::time::{TimeQuery, TimeResponse};
use crate::error::AppError;

pub async fn server_time(
    query: Result<Query<TimeQuery>, QueryRejection>,
) -> Result<Json<TimeResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::bad_request(e.body_text()))?;

    Ok(Json(TimeResponse {
        server_time: Utc::now(),
        at: query.at,
    }))
}
