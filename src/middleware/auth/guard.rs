//! Route registration with access policies + the per-route guard.
//!
//! Each route is registered together with its `EndpointPolicy`. The guard runs as a
//! `route_layer`, i.e. after routing and after the binder layer wrapping the router,
//! and looks the matched path up in the shared `RoutePolicies`.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::error::AppError;
use crate::services::auth::policy::{DEFAULT_POLICY, authorize};
use crate::services::auth::{EndpointPolicy, RequestIdentity, RoutePolicies};
use crate::state::AppState;

/// Router builder that records a policy for every route it registers.
///
/// - `route` → `AuthenticatedOnly` (default deny for anonymous callers)
/// - `public` → `Public`
/// - `route_with` → explicit policy
///
/// The resulting `RoutePolicies` must be installed as an `Extension<Arc<RoutePolicies>>`
/// around the router; without it every guarded route requires authentication.
pub struct SecuredRouter {
    base: String,
    router: Router<AppState>,
    policies: RoutePolicies,
}

impl SecuredRouter {
    /// `base` is the prefix the router will be nested under; it only affects recorded paths.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            router: Router::new(),
            policies: RoutePolicies::default(),
        }
    }

    pub fn route(self, path: &str, method_router: MethodRouter<AppState>) -> Self {
        self.route_with(path, method_router, EndpointPolicy::default())
    }

    pub fn public(self, path: &str, method_router: MethodRouter<AppState>) -> Self {
        self.route_with(path, method_router, EndpointPolicy::Public)
    }

    /// # Panics
    ///
    /// When `path` was already registered. Put every method of a path in one
    /// `MethodRouter` so the path has a single policy.
    pub fn route_with(
        mut self,
        path: &str,
        method_router: MethodRouter<AppState>,
        policy: EndpointPolicy,
    ) -> Self {
        if let Err(duplicate) = self.policies.declare(format!("{}{}", self.base, path), policy) {
            panic!("{duplicate}");
        }

        self.router = self
            .router
            .route(path, method_router.route_layer(middleware::from_fn(guard)));
        self
    }

    pub fn into_parts(self) -> (Router<AppState>, RoutePolicies) {
        (self.router, self.policies)
    }
}

async fn guard(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    {
        let extensions = req.extensions();
        // binder が無い経路では Unbound と同じ扱い (fail closed)
        let identity = extensions
            .get::<RequestIdentity>()
            .and_then(RequestIdentity::identity);

        let policy = match (
            extensions.get::<Arc<RoutePolicies>>(),
            extensions.get::<MatchedPath>(),
        ) {
            (Some(policies), Some(path)) => policies.policy_for(path.as_str()),
            _ => {
                tracing::warn!("route policies unavailable, requiring authentication");
                &DEFAULT_POLICY
            }
        };

        if let Err(denied) = authorize(policy, identity) {
            tracing::debug!(policy = policy.kind(), reason = %denied, "request denied");
            return Err(denied.into());
        }
    }

    Ok(next.run(req).await)
}
