//! Service configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use indobat_core::MAX_PAGE_SIZE;
use indobat_db::DbConfig;

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Connection pool size
    pub db_max_connections: u32,

    /// How long an order waits for the write lock before failing
    pub db_busy_timeout_ms: u64,

    /// Listing limit used when the caller gives none
    pub default_page_size: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            db_path: PathBuf::from("./indobat.db"),
            db_max_connections: 5,
            db_busy_timeout_ms: 5000,
            default_page_size: indobat_core::DEFAULT_PAGE_SIZE,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ServiceConfig::default();

        let config = ServiceConfig {
            db_path: lookup("INDOBAT_DB_PATH")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),

            db_max_connections: parse_or(&lookup, "INDOBAT_DB_MAX_CONNECTIONS", defaults.db_max_connections)?,

            db_busy_timeout_ms: parse_or(&lookup, "INDOBAT_DB_BUSY_TIMEOUT_MS", defaults.db_busy_timeout_ms)?,

            default_page_size: parse_or(&lookup, "INDOBAT_DEFAULT_PAGE_SIZE", defaults.default_page_size)?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("INDOBAT_DB_MAX_CONNECTIONS".to_string()));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&config.default_page_size) {
            return Err(ConfigError::InvalidValue("INDOBAT_DEFAULT_PAGE_SIZE".to_string()));
        }

        Ok(config)
    }

    /// Overrides the database path (CLI `--db`).
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.db_path.clone())
            .max_connections(self.db_max_connections)
            .busy_timeout(Duration::from_millis(self.db_busy_timeout_ms))
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
