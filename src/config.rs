//! Server configuration from environment variables.

use crate::error::ConfigError;
use std::net::SocketAddr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/vehicles";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Which `VehicleStore` backs the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process-local; contents are lost on restart.
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::InvalidValue {
                key: "STORE_BACKEND",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: String,
    /// Schema holding the `unit` and `vehicle` tables. From `VEHICLE_SCHEMA`, default `public`.
    pub schema: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub backend: StoreBackend,
    pub body_limit_bytes: usize,
}

impl ServerConfig {
    /// Read from the process environment. Call `dotenvy::dotenv()` first to honour a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let schema = lookup("VEHICLE_SCHEMA").unwrap_or_else(|| "public".into());
        if !is_identifier(&schema) {
            return Err(ConfigError::InvalidSchema(schema));
        }
        let bind_addr = parse_or("BIND_ADDR", lookup("BIND_ADDR"), DEFAULT_BIND_ADDR.parse().ok())?;
        let max_connections = parse_or("DATABASE_MAX_CONNECTIONS", lookup("DATABASE_MAX_CONNECTIONS"), Some(5))?;
        let backend = parse_or("STORE_BACKEND", lookup("STORE_BACKEND"), Some(StoreBackend::Postgres))?;
        let body_limit_bytes = parse_or("BODY_LIMIT_BYTES", lookup("BODY_LIMIT_BYTES"), Some(DEFAULT_BODY_LIMIT_BYTES))?;
        Ok(ServerConfig {
            database_url,
            schema,
            bind_addr,
            max_connections,
            backend,
            body_limit_bytes,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: Option<T>,
) -> Result<T, ConfigError> {
    match raw {
        Some(s) => s.trim().parse().map_err(|_| ConfigError::InvalidValue { key, value: s }),
        None => default.ok_or(ConfigError::InvalidValue {
            key,
            value: String::new(),
        }),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
