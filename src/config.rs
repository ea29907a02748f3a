/*
 * Responsibility
 * - 環境変数の読み込み (PORT, upstream URLs, JWT_SECRET など)
 * - 設定値のバリデーション (不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

pub const DEFAULT_PORT: u16 = 3333;
pub const DEFAULT_AUTH_MS_URL: &str = "http://auth-service:8081";
pub const DEFAULT_PACIENTE_MS_URL: &str = "http://paciente-service:8082";
pub const DEFAULT_CONSULTA_MS_URL: &str = "http://consulta-service:8083";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub auth_ms_url: Url,
    pub paciente_ms_url: Url,
    pub consulta_ms_url: Url,

    // HS256 shared secret. None = every bearer token is rejected.
    pub jwt_secret: Option<String>,
    pub jwt_leeway_seconds: u64,

    pub upstream_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the secret
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("auth_ms_url", &self.auth_ms_url.as_str())
            .field("paciente_ms_url", &self.paciente_ms_url.as_str())
            .field("consulta_ms_url", &self.consulta_ms_url.as_str())
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "***"))
            .field("jwt_leeway_seconds", &self.jwt_leeway_seconds)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("body_limit_bytes", &self.body_limit_bytes)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = match std::env::var("PORT") {
            Ok(s) => s.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => DEFAULT_PORT,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let auth_ms_url = upstream_url("AUTH_MS_URL", DEFAULT_AUTH_MS_URL)?;
        let paciente_ms_url = upstream_url("PACIENTE_MS_URL", DEFAULT_PACIENTE_MS_URL)?;
        let consulta_ms_url = upstream_url("CONSULTA_MS_URL", DEFAULT_CONSULTA_MS_URL)?;

        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let jwt_leeway_seconds = env_number("JWT_LEEWAY_SECONDS", 0u64)?;

        let upstream_timeout_seconds = env_number("UPSTREAM_TIMEOUT_SECONDS", 30u64)?;
        if upstream_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("UPSTREAM_TIMEOUT_SECONDS"));
        }

        let body_limit_bytes = env_number("BODY_LIMIT_BYTES", 10 * 1024 * 1024usize)?;

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            auth_ms_url,
            paciente_ms_url,
            consulta_ms_url,
            jwt_secret,
            jwt_leeway_seconds,
            upstream_timeout: Duration::from_secs(upstream_timeout_seconds),
            body_limit_bytes,
        })
    }

    /// Outer per-request deadline. Leaves room for the upstream timeout to fire first (502).
    pub fn request_timeout(&self) -> Duration {
        self.upstream_timeout + Duration::from_secs(5)
    }
}

fn env_number<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => parse_number(&raw).ok_or(ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

pub(crate) fn parse_number<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

fn upstream_url(key: &'static str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    parse_upstream_url(&raw).ok_or(ConfigError::Invalid(key))
}

pub(crate) fn parse_upstream_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Some(url),
        _ => None,
    }
}
