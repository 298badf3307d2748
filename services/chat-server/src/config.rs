//! Environment-variable configuration, following `services/server`'s
//! precedent of loading directly in `main` rather than a TOML file.

use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub max_line_bytes: usize,
    pub max_outbound_bytes: usize,
    pub cache_ttl: Duration,
    pub avatar_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:7777".to_owned()),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", 10),
            max_line_bytes: env_parse("MAX_LINE_BYTES", 10 * 1024 * 1024),
            max_outbound_bytes: env_parse("MAX_OUTBOUND_BYTES", 10 * 1024 * 1024),
            cache_ttl: Duration::from_secs(env_parse("CACHE_TTL_SECONDS", 300)),
            avatar_dir: env::var("AVATAR_DIR").unwrap_or_else(|_| "./avatars".to_owned()),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
