//! Bootstrap configuration
//!
//! The TOML file only carries bootstrap concerns: where the database lives,
//! where to listen, how to log, and which enrichment provider to use. Values
//! resolve in this order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Built-in default (fallback)
//!
//! Steps 1 and 2 are handled by the binary's `clap` parser; this module
//! covers 3 and 4.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default listen address for the catalog service
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5740";

/// Bootstrap configuration loaded from TOML file
///
/// Cannot change while running; restart to pick up edits.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// Path to SQLite database file (relative or absolute)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// HTTP listen address
    #[serde(default)]
    pub bind_addr: Option<String>,

    /// Seconds to wait for in-flight requests on shutdown
    #[serde(default)]
    pub shutdown_grace_secs: Option<u64>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, one event per line
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Enrichment provider selection
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default)]
    pub provider: ProviderKind,

    /// Base URL of the metadata provider (required for `http`)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Which enrichment strategy the service is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Remote provider reached over HTTP
    #[default]
    Http,
    /// In-process canned catalogue, for local runs and demos
    Fixture,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl TomlConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration if the file exists
    ///
    /// A missing file is not an error (`Ok(None)`): the caller falls back to
    /// built-in defaults. A file that exists but fails to parse is an error.
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Database path, falling back to the platform default
    pub fn database_path_or_default(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }

    /// Listen address, falling back to [`DEFAULT_BIND_ADDR`]
    pub fn bind_addr_or_default(&self) -> String {
        self.bind_addr
            .clone()
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
    }

    pub fn shutdown_grace_secs_or_default(&self) -> u64 {
        self.shutdown_grace_secs.unwrap_or(5)
    }
}

/// Default configuration file location for the platform
///
/// `~/.config/songlib/config.toml` on Linux, the platform config dir elsewhere.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("songlib").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("./songlib.toml"))
}

/// Default database location for the platform
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("songlib").join("songlib.db"))
        .unwrap_or_else(|| PathBuf::from("./songlib_data/songlib.db"))
}
