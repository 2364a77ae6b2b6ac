use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use innkeep_application::{DEFAULT_PERMISSION_CACHE_TTL_SECONDS, DEFAULT_PERMISSION_LOOKUP_TIMEOUT};
use innkeep_core::AppError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionCacheBackend {
    InMemory,
    Redis,
}

impl FromStr for PermissionCacheBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "in_memory" => Ok(Self::InMemory),
            "redis" => Ok(Self::Redis),
            other => Err(AppError::Validation(format!(
                "PERMISSION_CACHE_BACKEND must be either 'in_memory' or 'redis', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub permission_cache_backend: PermissionCacheBackend,
    pub redis_url: Option<String>,
    pub permission_cache_ttl_seconds: u32,
    pub permission_lookup_timeout: Duration,
    pub legacy_role_checks: bool,
    pub legacy_permission_bridge: bool,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let cookie_secure = bool_env("SESSION_COOKIE_SECURE", false);

        let permission_cache_backend = env::var("PERMISSION_CACHE_BACKEND")
            .unwrap_or_else(|_| "in_memory".to_owned())
            .parse::<PermissionCacheBackend>()?;
        let redis_url = env::var("REDIS_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());
        if permission_cache_backend == PermissionCacheBackend::Redis && redis_url.is_none() {
            return Err(AppError::Validation(
                "REDIS_URL is required when PERMISSION_CACHE_BACKEND=redis".to_owned(),
            ));
        }

        let permission_cache_ttl_seconds = parsed_env(
            "PERMISSION_CACHE_TTL_SECONDS",
            DEFAULT_PERMISSION_CACHE_TTL_SECONDS,
        )?;
        let lookup_timeout_ms = parsed_env(
            "PERMISSION_LOOKUP_TIMEOUT_MS",
            u64::try_from(DEFAULT_PERMISSION_LOOKUP_TIMEOUT.as_millis()).unwrap_or(2_000),
        )?;
        if lookup_timeout_ms == 0 {
            return Err(AppError::Validation(
                "PERMISSION_LOOKUP_TIMEOUT_MS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            cookie_secure,
            permission_cache_backend,
            redis_url,
            permission_cache_ttl_seconds,
            permission_lookup_timeout: Duration::from_millis(lookup_timeout_ms),
            legacy_role_checks: bool_env("LEGACY_ROLE_CHECKS", true),
            legacy_permission_bridge: bool_env("LEGACY_PERMISSION_BRIDGE", true),
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn bool_env(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|value| value.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parsed_env<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}
