// Runtime configuration read from the environment

use std::time::Duration;

/// Secrets shorter than this still work but are logged as weak
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Service settings
#[derive(Clone)]
pub struct Settings {
    pub jwt_secret: String,
    /// `None` runs the service on the in-memory stores
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub database_max_connections: u32,
    pub repository_timeout: Duration,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("jwt_secret", &"<redacted>")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_max_connections", &self.database_max_connections)
            .field("repository_timeout", &self.repository_timeout)
            .finish()
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key -> value lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            tracing::warn!(
                "JWT_SECRET is shorter than {} bytes; use a longer random secret",
                MIN_SECRET_LEN
            );
        }

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 8080)?;
        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?;
        let timeout_ms: u64 = parse_or(&lookup, "REPOSITORY_TIMEOUT_MS", 3000)?;

        Ok(Self {
            jwt_secret,
            database_url,
            host,
            port,
            database_max_connections,
            repository_timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
