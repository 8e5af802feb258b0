/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可、JWT secret など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// HS256 keys shorter than this are rejected at startup.
pub const MIN_SECRET_LEN: usize = 32;

/// Lifetime of minted access tokens unless `ACCESS_TOKEN_TTL_SECONDS` says otherwise.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: u64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Process-wide HMAC signing secret.
///
/// Loaded once at startup and shared read-only. `Debug` never prints the value.
#[derive(Clone)]
pub struct SigningSecret(String);

impl SigningSecret {
    pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
        let value = value.into();
        if value.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }
        Ok(Self(value))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub jwt_secret: SigningSecret,
    // iss/aud are only checked when configured
    pub auth_issuer: Option<String>,
    pub auth_audience: Option<String>,

    pub request_timeout: Duration,
    pub user_lookup_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 5)?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = split_list(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let jwt_secret = SigningSecret::new(
            std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?,
        )?;

        let auth_issuer = non_empty_var("AUTH_ISSUER");
        let auth_audience = non_empty_var("AUTH_AUDIENCE");

        let request_timeout = Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECONDS", 30)?);
        let user_lookup_timeout = Duration::from_millis(parse_or("USER_LOOKUP_TIMEOUT_MS", 2000)?);

        Ok(Self {
            addr,
            database_url,
            database_max_connections,
            app_env,
            cors_allowed_origins,
            jwt_secret,
            auth_issuer,
            auth_audience,
            request_timeout,
            user_lookup_timeout,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Unset falls back to the default; set-but-unparseable fails startup.
fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
