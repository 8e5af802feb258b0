//! Bearer token → `RequestIdentity` を extensions に入れる
//!
//! - 検証/解決に失敗しても拒否しない (Unbound のまま次へ渡す)
//! - 401/403 の判断は route ごとの guard が行う

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::services::auth::RequestIdentity;
use crate::state::AppState;

/// Bind the caller's identity for every request routed through `router`.
///
/// Must wrap the routes whose guards read the identity:
/// ```ignore
/// let (v1, policies) = api::v1::routes();
/// let v1 = middleware::auth::binder::apply(v1, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, bind_identity))
}

async fn bind_identity(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // 1 リクエストにつき 1 回だけ
    if req.extensions().get::<RequestIdentity>().is_none() {
        let identity = state.binder.bind(req.headers()).await;
        req.extensions_mut().insert(identity);
    }

    next.run(req).await
}
