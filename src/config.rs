// Application configuration loaded once from the environment

use crate::auth::HashingCost;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("Invalid {name} value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Process-wide configuration, immutable after startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub hashing_cost: HashingCost,
    pub cors_origin: String,
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from any variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let defaults = HashingCost::default();
        // SALTS is the older name for the work factor
        let iterations = match lookup("HASH_COST").or_else(|| lookup("SALTS")) {
            Some(value) => parse_value("HASH_COST", &value)?,
            None => defaults.iterations,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", lookup("PORT"), 8080)?,
            jwt_secret: required("JWT_SECRET")?,
            hashing_cost: HashingCost {
                iterations,
                memory_kib: parse_or("HASH_MEMORY_KIB", lookup("HASH_MEMORY_KIB"), defaults.memory_kib)?,
            },
            cors_origin: lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string()),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), 5)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Settings for [`crate::client::AuthClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server root, e.g. `http://localhost:8080`
    pub base_url: String,
    /// Length of the client expiry timer; matches the token lifetime
    pub session_ttl: Duration,
    /// File backing the durable token storage
    pub storage_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            session_ttl: Duration::from_secs(120),
            storage_path: PathBuf::from("auth-client.json"),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Unset variables keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            base_url: lookup("AUTH_BASE_API").unwrap_or(defaults.base_url),
            session_ttl: defaults.session_ttl,
            storage_path: lookup("AUTH_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
        }
    }
}

fn parse_value<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

fn parse_or<T: FromStr>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        Some(value) => parse_value(name, &value),
        None => Ok(default),
    }
}
