/*
 * Responsibility
 * - users テーブル向け SQLx 操作 (auth からは読み取りのみ)
 * - PgPool を受け取り lookup を提供
 * - DB エラーは RepoError に変換しやすい形で返す
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

/// A user as stored by the POS back office.
///
/// `role` here is the authoritative current role; the role inside a token is only a hint.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserRecord {
    #[sqlx(rename = "userId")]
    pub id: i64,
    #[sqlx(rename = "userName")]
    pub user_name: String,
    pub role: String,
    #[sqlx(rename = "isActive")]
    pub is_active: bool,
}

pub async fn get(db: &PgPool, user_id: i64) -> Result<Option<UserRecord>, RepoError> {
    let row = sqlx::query_as::<_, UserRecord>(
        r#"
        SELECT "userId", "userName", "role", "isActive"
        FROM users
        WHERE "userId" = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// Postgres-backed user store handed to the identity resolver.
#[derive(Clone, Debug)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}
