//! Connection settings.
//!
//! Settings come from the environment (with `.env` support) or from a TOML
//! file with a `[database]` table:
//!
//! ```toml
//! [database]
//! url = "postgres://vagrant@localhost/lightbnb"
//! pool_max_size = 8
//! slow_query_ms = 250
//! ```

use crate::error::{DbError, DbResult};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Connection string used when nothing else is configured.
pub const DEFAULT_DATABASE_URL: &str = "postgres://vagrant@localhost/lightbnb";

/// Pool size used when nothing else is configured.
pub const DEFAULT_POOL_MAX_SIZE: usize = 16;

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const POOL_SIZE_ENV: &str = "LIGHTBNB_POOL_SIZE";
pub const SLOW_QUERY_MS_ENV: &str = "LIGHTBNB_SLOW_QUERY_MS";

/// Settings for the pool and the query observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub database_url: String,
    pub pool_max_size: usize,
    /// Statements slower than this are reported as slow. `None` disables the check.
    pub slow_query_threshold: Option<Duration>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            slow_query_threshold: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    database: DatabaseSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatabaseSection {
    url: Option<String>,
    pool_max_size: Option<usize>,
    slow_query_ms: Option<u64>,
}

impl DbConfig {
    /// Read settings from the process environment, loading `.env` first if present.
    pub fn from_env() -> DbResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DbResult<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.database_url = url;
        }
        if let Some(raw) = lookup(POOL_SIZE_ENV) {
            config.pool_max_size = parse_pool_size(&raw, POOL_SIZE_ENV)?;
        }
        if let Some(raw) = lookup(SLOW_QUERY_MS_ENV) {
            let ms = raw.trim().parse::<u64>().map_err(|e| {
                DbError::config(format!("{SLOW_QUERY_MS_ENV}={raw:?} is not a number of milliseconds: {e}"))
            })?;
            config.slow_query_threshold = Some(Duration::from_millis(ms));
        }

        Ok(config)
    }

    /// Parse settings from TOML text.
    pub fn from_toml_str(raw: &str) -> DbResult<Self> {
        let file: ConfigFile =
            toml::from_str(raw).map_err(|e| DbError::config(format!("invalid config: {e}")))?;
        let section = file.database;
        let defaults = Self::default();

        if section.pool_max_size == Some(0) {
            return Err(DbError::config("database.pool_max_size must be at least 1"));
        }

        Ok(Self {
            database_url: section.url.unwrap_or(defaults.database_url),
            pool_max_size: section.pool_max_size.unwrap_or(defaults.pool_max_size),
            slow_query_threshold: section.slow_query_ms.map(Duration::from_millis),
        })
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DbError::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    pub fn pool_max_size(mut self, size: usize) -> Self {
        self.pool_max_size = size;
        self
    }

    pub fn slow_query_threshold(mut self, threshold: Option<Duration>) -> Self {
        self.slow_query_threshold = threshold;
        self
    }
}

fn parse_pool_size(raw: &str, key: &str) -> DbResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(DbError::config(format!("{key} must be at least 1"))),
        Ok(n) => Ok(n),
        Err(e) => Err(DbError::config(format!("{key}={raw:?} is not a pool size: {e}"))),
    }
}
