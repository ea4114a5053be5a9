//! Configuration loading

use anyhow::{Context, Result};
use gatekeeper_auth::{AuthType, HashScheme, SessionExpiry, UnconfiguredPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Snapshot storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// "file", "sqlite" or "memory"
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Directory holding `.db_<Kind>.json` files
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// SQLite database file for the sqlite backend
    #[serde(default = "default_db_path")]
    pub database: String,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_auth_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub auth_type: AuthType,
    #[serde(default)]
    pub hasher: HashScheme,
    #[serde(default = "default_session_name")]
    pub session_name: String,
    /// Seconds; kept loose so that malformed values fall back to no expiry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_duration: Option<toml::Value>,
    /// 0 disables the background sweeper
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Require authentication when there is nothing to match against
    #[serde(default)]
    pub fail_closed: bool,
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,
}

impl AuthConfig {
    /// Configured duration as text, as an environment override would give it
    pub fn session_duration_text(&self) -> Option<String> {
        self.session_duration.as_ref().map(|value| match value {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn session_expiry(&self) -> SessionExpiry {
        SessionExpiry::parse(self.session_duration_text().as_deref())
    }

    pub fn unconfigured_policy(&self) -> UnconfiguredPolicy {
        if self.fail_closed {
            UnconfiguredPolicy::Closed
        } else {
            UnconfiguredPolicy::Open
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_storage_path(),
            database: default_db_path(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: default_auth_enabled(),
            auth_type: AuthType::default(),
            hasher: HashScheme::default(),
            session_name: default_session_name(),
            session_duration: None,
            sweep_interval_secs: default_sweep_interval(),
            fail_closed: false,
            excluded_paths: default_excluded_paths(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_backend() -> String {
    "file".to_string()
}

fn default_storage_path() -> String {
    "./data".to_string()
}

fn default_db_path() -> String {
    "./data/gatekeeper.db".to_string()
}

fn default_auth_enabled() -> bool {
    true
}

fn default_session_name() -> String {
    gatekeeper_auth::DEFAULT_SESSION_NAME.to_string()
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_excluded_paths() -> Vec<String> {
    [
        "/api/v1/status/",
        "/api/v1/unauthorized/",
        "/api/v1/forbidden/",
        "/api/v1/auth_session/login/",
        "/api/v1/accounts/",
        "/api/v1/reset_password/",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }
}
