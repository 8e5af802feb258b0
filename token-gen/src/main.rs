use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use pos_api::config::{DEFAULT_ACCESS_TOKEN_TTL_SECONDS, SigningSecret};
use pos_api::services::auth::TokenIssuer;

/// Mint an HS256 bearer token for local testing against the POS API.
///
/// Reads `JWT_SECRET` (and `AUTH_ISSUER` / `AUTH_AUDIENCE` if set) from the
/// environment or `.env`, the same way the server does.
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Numeric user id (written as the `nameid` claim)
    #[arg(long)]
    subject: i64,

    /// Role label, e.g. Admin / Manager / Cashier (case-sensitive)
    #[arg(long)]
    role: String,

    /// Lifetime in seconds
    #[arg(long, env = "ACCESS_TOKEN_TTL_SECONDS", default_value_t = DEFAULT_ACCESS_TOKEN_TTL_SECONDS)]
    ttl: u64,

    /// Extra claims as key=value (string values)
    #[arg(long = "claim", value_name = "KEY=VALUE")]
    claims: Vec<String>,
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn main() -> Result<()> {
    // .env を先に読み込み、clap の env fallback (ACCESS_TOKEN_TTL_SECONDS) にも効かせる
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let secret = SigningSecret::new(std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?)
        .context("JWT_SECRET is too short")?;
    let issuer = TokenIssuer::new(
        &secret,
        env_opt("AUTH_ISSUER"),
        env_opt("AUTH_AUDIENCE"),
        args.ttl,
    );

    let mut claims = issuer.claims_at(args.subject, &args.role, Utc::now())?;
    for pair in &args.claims {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("expected KEY=VALUE, got {pair:?}"))?;
        claims = claims.with_extra(key, serde_json::Value::String(value.to_string()));
    }

    println!("{}", issuer.sign(&claims)?);
    Ok(())
}
