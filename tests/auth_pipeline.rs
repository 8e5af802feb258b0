use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use pos_api::app::build_router;
use pos_api::config::{AppEnv, Config, SigningSecret};
use pos_api::repos::error::RepoError;
use pos_api::repos::user_repo::UserRecord;
use pos_api::services::auth::token_issuer::IssueClaims;
use pos_api::services::auth::{TokenIssuer, UserLookup, build_identity_binder};
use pos_api::state::AppState;

const SECRET: &str = "integration-test-secret-0123456789abcdef";

struct MemoryUsers(HashMap<i64, UserRecord>);

#[async_trait]
impl UserLookup for MemoryUsers {
    async fn lookup_user(&self, id: i64) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.0.get(&id).cloned())
    }
}

fn user(id: i64, role: &str, is_active: bool) -> UserRecord {
    UserRecord {
        id,
        user_name: format!("user-{id}"),
        role: role.to_string(),
        is_active,
    }
}

fn test_config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".into(),
        database_max_connections: 1,
        app_env: AppEnv::Development,
        cors_allowed_origins: Vec::new(),
        jwt_secret: SigningSecret::new(SECRET).unwrap(),
        auth_issuer: None,
        auth_audience: None,
        request_timeout: Duration::from_secs(5),
        user_lookup_timeout: Duration::from_secs(1),
    }
}

fn app() -> Router {
    let config = test_config();
    let users: Arc<dyn UserLookup> = Arc::new(MemoryUsers(
        [
            user(1, "Admin", true),
            user(2, "Cashier", true),
            user(3, "Manager", true),
            user(4, "Admin", false),
        ]
        .into_iter()
        .map(|u| (u.id, u))
        .collect(),
    ));
    let binder = build_identity_binder(&config, users.clone());
    build_router(AppState::new(binder, users), &config)
}

fn token(id: i64, role: &str) -> String {
    TokenIssuer::new(&SigningSecret::new(SECRET).unwrap(), None, None, 600)
        .issue(id, role)
        .unwrap()
}

async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut req = Request::builder().uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let res = app
        .clone()
        .oneshot(req.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn public_endpoint_ignores_token_state() {
    let app = app();
    let foreign = TokenIssuer::new(
        &SigningSecret::new("some-other-secret-some-other-secret").unwrap(),
        None,
        None,
        600,
    )
    .issue(1, "Admin")
    .unwrap();

    let cashier = token(2, "Cashier");

    for bearer in [None, Some("garbage"), Some(foreign.as_str()), Some(cashier.as_str())] {
        let (status, body) = get(&app, "/api/v1/health", bearer).await;
        assert_eq!(status, StatusCode::OK, "{bearer:?}");
        assert_eq!(body, json!({ "status": "ok" }));
    }
}

#[tokio::test]
async fn missing_header_is_401_with_fixed_message() {
    let (status, body) = get(&app(), "/api/v1/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "Unauthorized" }));
}

#[tokio::test]
async fn authenticated_endpoint_accepts_any_role() {
    let (status, body) = get(&app(), "/api/v1/auth/me", Some(&token(2, "Cashier"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 2);
    assert_eq!(body["role"], "Cashier");
    assert_eq!(body["current_role"], "Cashier");
}

#[tokio::test]
async fn expired_token_is_treated_as_anonymous() {
    let secret = SigningSecret::new(SECRET).unwrap();
    let expired = TokenIssuer::new(&secret, None, None, 600)
        .sign(&IssueClaims::new(1, "Admin", Utc::now().timestamp() - 10))
        .unwrap();

    let app = app();
    assert_eq!(get(&app, "/api/v1/auth/me", Some(&expired)).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(get(&app, "/api/v1/health", Some(&expired)).await.0, StatusCode::OK);
}

#[tokio::test]
async fn admin_endpoint_checks_auth_before_role() {
    let app = app();

    let (status, body) = get(&app, "/api/v1/users/2", Some(&token(1, "Admin"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_name"], "user-2");

    let (status, body) = get(&app, "/api/v1/users/2", Some(&token(2, "Cashier"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "message": "Forbidden" }));

    // no identity is never a 403, even when the (unverifiable) token claims Admin
    assert_eq!(get(&app, "/api/v1/users/2", None).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(
        get(&app, "/api/v1/users/2", Some("not.a.jwt")).await.0,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn inactive_or_unknown_users_are_unauthenticated() {
    let app = app();
    assert_eq!(
        get(&app, "/api/v1/users/1", Some(&token(4, "Admin"))).await.0,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        get(&app, "/api/v1/users/1", Some(&token(99, "Admin"))).await.0,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn role_comes_from_the_token() {
    // user 2 is a Cashier in the store, but the guard only reads the token role
    let (status, _) = get(&app(), "/api/v1/users/1", Some(&token(2, "Admin"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_user_lookup_is_404_for_admins() {
    let (status, body) = get(&app(), "/api/v1/users/404", Some(&token(1, "Admin"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "user not found." }));
}

#[tokio::test]
async fn access_report_lists_declared_policies() {
    let app = app();

    let (status, body) = get(&app, "/api/v1/reports/access", Some(&token(3, "Manager"))).await;
    assert_eq!(status, StatusCode::OK);

    let entries = body.as_array().unwrap();
    assert!(entries.contains(&json!({ "path": "/api/v1/health", "policy": "public" })));
    assert!(entries.contains(&json!({ "path": "/api/v1/auth/me", "policy": "authenticated" })));
    assert!(entries.contains(&json!({
        "path": "/api/v1/users/{user_id}",
        "policy": "roles",
        "roles": ["Admin"],
    })));

    assert_eq!(
        get(&app, "/api/v1/reports/access", Some(&token(2, "Cashier"))).await.0,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn time_parameters_are_normalized_to_utc() {
    let app = app();

    let (status, body) = get(&app, "/api/v1/time?at=2024-03-01T10:00:00%2B02:00", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["at"], "2024-03-01T08:00:00Z");

    let (_, body) = get(&app, "/api/v1/time?at=2024-03-01T10:00:00", None).await;
    assert_eq!(body["at"], "2024-03-01T10:00:00Z");

    let (status, body) = get(&app, "/api/v1/time?at=yesterday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn concurrent_requests_do_not_share_identity() {
    let app = app();
    let admin = token(1, "Admin");
    let cashier = token(2, "Cashier");

    let (a, c, anon) = tokio::join!(
        get(&app, "/api/v1/auth/me", Some(&admin)),
        get(&app, "/api/v1/auth/me", Some(&cashier)),
        get(&app, "/api/v1/auth/me", None),
    );

    assert_eq!(a.1["id"], 1);
    assert_eq!(c.1["id"], 2);
    assert_eq!(anon.0, StatusCode::UNAUTHORIZED);
}
