//! Configuration management using Figment
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. `./cursor-pagination.toml` (or the file given to [`Config::load_from`])
//! 3. Environment variables prefixed `CURSOR_PAGINATION_`, nested on `__`
//!    (e.g. `CURSOR_PAGINATION_PAGINATION__DEFAULT_LIMIT=25`)
//!
//! ```toml
//! [pagination]
//! default_limit = 100
//! include_total_count = true
//!
//! [logging]
//! level = "info"
//! json = true
//! ```

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Config file read by [`Config::load`]
pub const DEFAULT_CONFIG_FILE: &str = "cursor-pagination.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CURSOR_PAGINATION_";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Pagination defaults
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Pagination defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Page size used when a query sets no limit (or a zero limit)
    #[serde(default = "default_limit")]
    pub default_limit: u64,

    /// Issue the independent count round trip for `totalCount`
    #[serde(default = "default_true")]
    pub include_total_count: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            include_total_count: default_true(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `cursor_pagination=debug`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default = "default_true")]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_true(),
        }
    }
}

fn default_limit() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from `./cursor-pagination.toml` and the environment
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file
    ///
    /// Environment variables still override the file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::debug!("Loading configuration from: {}", path.display());
        }

        let config: Self = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()))
            // Load from config file (if exists)
            .merge(Toml::file(path))
            // Override with environment variables
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject values that would make pagination meaningless
    pub fn validate(&self) -> Result<()> {
        if self.pagination.default_limit == 0 {
            return Err(Error::InvalidConfig(
                "pagination.default_limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
