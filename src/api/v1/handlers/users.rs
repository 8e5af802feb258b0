/*
 * Responsibility
 * - GET /users/{user_id} (Admin)
 * - user store を読むだけ。作成/更新は back office 側の責務
 */
use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};

use crate::{api::v1::dto::users::UserResponse, error::AppError, state::AppState};

pub async fn get_user(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Path(user_id) = user_id.map_err(|_| AppError::bad_request("user_id must be an integer"))?;

    let user = state
        .users
        .lookup_user(user_id)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(user.into()))
}
