/// Configuration management for Article Service
use entity_cache::WriteDiscipline;
use serde::Deserialize;
use std::env;

const DEV_JWT_SECRET: &str = "dev-only-article-service-secret";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_env")]
    pub env: String,

    #[serde(default = "default_app_host")]
    pub host: String,

    #[serde(default = "default_app_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub url: String,

    /// How concurrent writers to the listing snapshot are coordinated
    #[serde(default)]
    pub list_write_discipline: WriteDiscipline,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,

    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,

    /// Argon2 (memory KiB, iterations, parallelism); library defaults when unset
    #[serde(default)]
    pub argon2_cost: Option<(u32, u32, u32)>,
}

fn default_app_env() -> String {
    "development".to_string()
}

fn default_app_host() -> String {
    "0.0.0.0".to_string()
}

fn default_app_port() -> u16 {
    8080
}

fn default_db_max_connections() -> u32 {
    20
}

fn default_token_ttl() -> i64 {
    3600
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app = AppConfig {
            env: lookup("APP_ENV").unwrap_or_else(default_app_env),
            host: lookup("APP_HOST").unwrap_or_else(default_app_host),
            port: parse_or(&lookup, "APP_PORT", default_app_port())?,
        };
        let is_production = app.env.eq_ignore_ascii_case("production");

        let database = DatabaseConfig {
            url: lookup("DATABASE_URL").ok_or("DATABASE_URL must be set")?,
            max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                default_db_max_connections(),
            )?,
        };

        let cache = CacheConfig {
            url: lookup("REDIS_URL").ok_or("REDIS_URL must be set")?,
            list_write_discipline: parse_or(
                &lookup,
                "LIST_CACHE_WRITE_DISCIPLINE",
                WriteDiscipline::default(),
            )?,
        };

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.trim().is_empty() => secret,
            _ if is_production => {
                return Err("JWT_SECRET must be set in production".to_string());
            }
            _ => {
                tracing::warn!("JWT_SECRET not set, using development secret");
                DEV_JWT_SECRET.to_string()
            }
        };
        if is_production && jwt_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 bytes in production".to_string());
        }

        let argon2_cost = match (
            lookup("ARGON2_MEMORY_KIB"),
            lookup("ARGON2_ITERATIONS"),
            lookup("ARGON2_PARALLELISM"),
        ) {
            (None, None, None) => None,
            (Some(m), Some(t), Some(p)) => Some((
                parse_value("ARGON2_MEMORY_KIB", &m)?,
                parse_value("ARGON2_ITERATIONS", &t)?,
                parse_value("ARGON2_PARALLELISM", &p)?,
            )),
            _ => {
                return Err(
                    "ARGON2_MEMORY_KIB, ARGON2_ITERATIONS and ARGON2_PARALLELISM must be set together"
                        .to_string(),
                )
            }
        };

        let auth = AuthConfig {
            jwt_secret,
            token_ttl_secs: parse_or(&lookup, "JWT_ACCESS_TOKEN_TTL", default_token_ttl())?,
            argon2_cost,
        };

        Ok(Config {
            app,
            database,
            cache,
            auth,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case("production")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| format!("Invalid {}: {}", key, e))
}
