/*
 * Responsibility
 * - v1 の URL 構造と、route ごとの access policy を定義
 * - policy を書かない route は AuthenticatedOnly (匿名は 401)
 */
use axum::{Router, routing::get};

use crate::api::v1::PREFIX;
use crate::api::v1::handlers::{
    health::health, me::me, reports::access_report, time::server_time, users::get_user,
};
use crate::middleware::auth::SecuredRouter;
use crate::services::auth::policy::{EndpointPolicy, ROLE_ADMIN, ROLE_MANAGER, RoutePolicies};
use crate::state::AppState;

pub fn routes() -> (Router<AppState>, RoutePolicies) {
    SecuredRouter::new(PREFIX)
        .public("/health", get(health))
        .public("/time", get(server_time))
        .route("/auth/me", get(me))
        .route_with(
            "/users/{user_id}",
            get(get_user),
            EndpointPolicy::roles([ROLE_ADMIN]),
        )
        .route_with(
            "/reports/access",
            get(access_report),
            EndpointPolicy::roles([ROLE_ADMIN, ROLE_MANAGER]),
        )
        .into_parts()
}
