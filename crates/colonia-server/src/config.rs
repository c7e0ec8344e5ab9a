//! Server configuration read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `COLONIA_DATABASE_PATH` | `colonia.db` |
//! | `COLONIA_DATABASE_MAX_CONNECTIONS` | `10` |
//! | `COLONIA_HOST` | `0.0.0.0` |
//! | `COLONIA_PORT` | `8000` |
//! | `COLONIA_QR_TTL_HOURS` | `24` |

use std::fmt::Display;
use std::str::FromStr;

use chrono::Duration;
use colonia_core::constants::{
    DEFAULT_DATABASE_PATH, DEFAULT_HOST, DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT,
    DEFAULT_QR_TTL_HOURS, MAX_QR_TTL_HOURS,
};
use colonia_core::{Error, Result};
use colonia_storage::DatabaseConfig;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    /// Lifetime of passes issued without an explicit expiration
    pub qr_ttl_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            qr_ttl_hours: DEFAULT_QR_TTL_HOURS,
        }
    }
}

impl Config {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    ///
    /// Unset or blank variables fall back to their defaults; values that do
    /// not parse are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            database_path: lookup("COLONIA_DATABASE_PATH")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.database_path),
            database_max_connections: parse_or(
                &lookup,
                "COLONIA_DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,
            host: lookup("COLONIA_HOST")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.host),
            port: parse_or(&lookup, "COLONIA_PORT", defaults.port)?,
            qr_ttl_hours: parse_or(&lookup, "COLONIA_QR_TTL_HOURS", defaults.qr_ttl_hours)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.database_max_connections == 0 {
            return Err(Error::Config(
                "COLONIA_DATABASE_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_QR_TTL_HOURS).contains(&self.qr_ttl_hours) {
            return Err(Error::Config(format!(
                "COLONIA_QR_TTL_HOURS must be between 1 and {MAX_QR_TTL_HOURS}"
            )));
        }
        Ok(())
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_path.clone()).max_connections(self.database_max_connections)
    }

    pub fn qr_ttl(&self) -> Duration {
        Duration::hours(self.qr_ttl_hours)
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("invalid {key} value {raw:?}: {e}"))),
        _ => {
            debug!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
