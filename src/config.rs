use std::env;
use std::time::Duration;

use crate::auth::password::DEFAULT_COST;

const DEFAULT_TOKEN_TTL_SECONDS: u64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process configuration, read once at startup.
pub struct Config {
    /// Postgres connection string. Without it the in-memory store is used.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    /// HS256 signing secret. Required and non-empty.
    pub jwt_secret: String,
    /// Lifetime of every issued token, for registration and login alike.
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let token_ttl_seconds: u64 = parse_or(&lookup, "TOKEN_TTL_SECONDS", DEFAULT_TOKEN_TTL_SECONDS)?;
        if token_ttl_seconds == 0 {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_SECONDS",
                reason: "must be positive".into(),
            });
        }

        let bcrypt_cost: u32 = parse_or(&lookup, "BCRYPT_COST", DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                reason: format!("{} is outside 4..=31", bcrypt_cost),
            });
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            server_port: parse_or(&lookup, "SERVER_PORT", 4000)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            token_ttl: Duration::from_secs(token_ttl_seconds),
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
