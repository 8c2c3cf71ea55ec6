//! Runtime configuration, read from the environment (and an optional `.env`).
//!
//! | Variable | Default |
//! |---|---|
//! | `DATABASE_URL` | required |
//! | `DATABASE_MAX_CONNECTIONS` | `5` |
//! | `RETRY_MAX_ATTEMPTS` | `3` |
//! | `RETRY_INITIAL_DELAY_MS` | `1000` |
//! | `BIND_ADDR` | `0.0.0.0:3000` |
// region:    --- Imports
use crate::retry::RetryPolicy;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

// endregion: --- Imports

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub retry: RetryPolicy,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?;
        let max_attempts = parse_or(&lookup, "RETRY_MAX_ATTEMPTS", 3)?;
        let initial_delay_ms = parse_or(&lookup, "RETRY_INITIAL_DELAY_MS", 1000)?;
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        Ok(Self {
            database_url,
            max_connections,
            retry: RetryPolicy::new(max_attempts, Duration::from_millis(initial_delay_ms)),
            bind_addr,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

// endregion: --- Tests
