/*
 * Responsibility
 * - Users の response DTO (auth からは読み取りのみ)
 */
use serde::Serialize;

use crate::repos::user_repo::UserRecord;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub user_name: String,
    pub role: String,
    pub is_active: bool,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name,
            role: user.role,
            is_active: user.is_active,
        }
    }
}
