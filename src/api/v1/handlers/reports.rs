/*
 * Responsibility
 * - GET /reports/access (Admin, Manager)
 * - 登録済み route と policy の一覧 (監査用)
 */
use std::sync::Arc;

use axum::{Extension, Json};

use crate::api::v1::dto::reports::RoutePolicyEntry;
use crate::services::auth::RoutePolicies;

pub async fn access_report(
    Extension(policies): Extension<Arc<RoutePolicies>>,
) -> Json<Vec<RoutePolicyEntry>> {
    Json(
        policies
            .iter()
            .map(|(path, policy)| RoutePolicyEntry::new(path, policy))
            .collect(),
    )
}
