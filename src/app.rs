/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (identity binder / CORS / request-id / timeout)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Extension, Router};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::repos::user_repo::PgUserStore;
use crate::services::auth::{UserLookup, build_identity_binder};
use crate::{api, config::Config, middleware, state::AppState};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,pos_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: 即座に落として気付けるようにする
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting POS API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to the user database")?;

    let users: Arc<dyn UserLookup> = Arc::new(PgUserStore::new(db));
    let binder = build_identity_binder(config, users.clone());

    Ok(AppState::new(binder, users))
}

/// Assemble the full HTTP stack around the v1 routes.
///
/// Order per request: request-id/trace/timeout → CORS → binder → routing → guard → handler.
pub fn build_router(state: AppState, config: &Config) -> Router {
    let (v1, policies) = api::v1::routes();
    for (path, policy) in policies.iter() {
        tracing::info!(path, policy = policy.kind(), "route policy");
    }

    let v1 = middleware::auth::binder::apply(v1, state.clone());

    let router = Router::new()
        .nest(api::v1::PREFIX, v1)
        .layer(Extension(Arc::new(policies)))
        .with_state(state);

    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config.request_timeout)
}
