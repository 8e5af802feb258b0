/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - binder: token 検証 + identity 解決
 *   - users: handler から使う user store
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - 起動後は読み取り専用 (リクエスト間で共有する可変状態は無い)
 */
use std::sync::Arc;

use crate::services::auth::{IdentityBinder, UserLookup};

#[derive(Clone)]
pub struct AppState {
    pub binder: Arc<IdentityBinder>,
    pub users: Arc<dyn UserLookup>,
}

impl AppState {
    pub fn new(binder: Arc<IdentityBinder>, users: Arc<dyn UserLookup>) -> Self {
        Self { binder, users }
    }
}
