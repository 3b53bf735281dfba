use std::{env, fmt::Display, str::FromStr};

use http::HeaderValue;
use tracing::info;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Postgres connection string; polls are kept in memory without one.
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// Single origin allowed by CORS, any origin when unset.
    pub cors_allow_origin: Option<HeaderValue>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            cors_allow_origin: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let cors_allow_origin = var("CORS_ALLOW_ORIGIN")
            .map(|origin| {
                HeaderValue::from_str(origin.trim()).map_err(|e| ConfigError::Invalid {
                    key: "CORS_ALLOW_ORIGIN".to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            port: try_load(var("PORT"), "PORT", DEFAULT_PORT)?,
            database_url: var("DATABASE_URL"),
            max_connections: try_load(
                var("DATABASE_MAX_CONNECTIONS"),
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            cors_allow_origin,
        })
    }
}

fn try_load<T>(value: Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
