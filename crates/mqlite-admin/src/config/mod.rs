//! Admin registry configuration.
//!
//! Supports configuration from:
//! - TOML file (default: `mqlite-admin.toml`)
//! - Environment variables with `MQLITE_ADMIN__` prefix (double underscore for nesting)
//! - In-file variable substitution: `${VAR}` or `${VAR:-default}`
//!
//! Environment variable examples:
//! - `MQLITE_ADMIN__LOG__LEVEL=debug`
//! - `MQLITE_ADMIN__ADMIN__DEFAULT_PAGE_SIZE=50`
//! - `MQLITE_ADMIN__PERSISTENCE__BACKEND=memory`
//!
//! In-file substitution examples:
//! ```toml
//! [admin]
//! max_page_size = ${ADMIN_MAX_PAGE_SIZE:-1000}
//! ```

mod admin;
mod log;
mod persistence;

use std::path::Path;
use std::sync::OnceLock;

use config::{Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;

pub use admin::{AdminConfig, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};
pub use log::LogConfig;
pub use persistence::{PersistenceConfig, DEFAULT_PERSISTENCE_BACKEND};

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "mqlite-admin.toml";

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env substitution pattern is valid")
    })
}

/// Substitute environment variables in a string.
/// Supports `${VAR}` and `${VAR:-default}` syntax.
fn substitute_env_vars(content: &str) -> String {
    env_var_pattern()
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var_name).unwrap_or_else(|_| default.to_string())
        })
        .to_string()
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration.
    pub log: LogConfig,
    /// Admin API configuration.
    pub admin: AdminConfig,
    /// Persistence backend selection.
    pub persistence: PersistenceConfig,
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// Config parsing/loading error.
    Config(config::ConfigError),
    /// Invalid configuration value.
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Config(e) => write!(f, "Config error: {}", e),
            ConfigError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(e: config::ConfigError) -> Self {
        ConfigError::Config(e)
    }
}

impl Config {
    /// Load configuration from a TOML file with environment variable overrides.
    ///
    /// A missing file is not an error; defaults and environment variables
    /// still apply.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("log.level", "info")?
            .set_default("admin.default_page_size", DEFAULT_PAGE_SIZE as i64)?
            .set_default("admin.max_page_size", DEFAULT_MAX_PAGE_SIZE as i64)?
            .set_default("persistence.backend", DEFAULT_PERSISTENCE_BACKEND)?;

        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let substituted = substitute_env_vars(&content);
            builder = builder.add_source(File::from_str(&substituted, FileFormat::Toml));
        }

        let cfg = builder
            .add_source(
                Environment::with_prefix("MQLITE_ADMIN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = cfg.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only (no file).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Path::new(""))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let substituted = substitute_env_vars(content);
        let config: Config = toml::from_str(&substituted)
            .map_err(|e| ConfigError::Validation(format!("TOML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.admin.validate().map_err(ConfigError::Validation)?;
        self.persistence
            .validate()
            .map_err(ConfigError::Validation)?;
        Ok(())
    }
}
