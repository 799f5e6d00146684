//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Result, TmmError};
use crate::handshake::protocol::{DEFAULT_RETURN_URL, TMM_SOCKET_HOST};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub handshake: HandshakeConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Port handshake configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HandshakeConfig {
    #[serde(default = "default_return_url")]
    pub return_url: String,

    #[serde(default = "default_socket_host")]
    pub socket_host: String,
}

/// Telemetry feed configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    /// Maximum records kept, 0 for unbounded
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily log files, empty to log to stderr only
    #[serde(default)]
    pub log_dir: String,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            return_url: default_return_url(),
            socket_host: default_socket_host(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { max_records: default_max_records() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

// Default value functions
fn default_return_url() -> String { DEFAULT_RETURN_URL.to_string() }
fn default_socket_host() -> String { TMM_SOCKET_HOST.to_string() }

fn default_max_records() -> usize { 10000 }

fn default_log_level() -> String { "info".to_string() }

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

fn invalid(message: impl std::fmt::Display) -> TmmError {
    TmmError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tmm_telemetry::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // The return URL must be a bare custom-scheme URL; TMM appends the query
        match self.handshake.return_url.split_once("://") {
            Some((scheme, rest)) if !scheme.is_empty() && !rest.is_empty() => {}
            _ => return Err(invalid("return_url must look like <scheme>://<host>")),
        }

        if self.handshake.return_url.contains('?') || self.handshake.return_url.contains('#') {
            return Err(invalid("return_url must not contain a query or fragment"));
        }

        if self.handshake.socket_host.is_empty() {
            return Err(invalid("socket_host cannot be empty"));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(invalid(format!(
                "log level must be one of: {}",
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}
