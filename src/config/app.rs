//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! registration service, including environment variable loading, TOML file
//! loading and validation.

use crate::store::validate_key;
use crate::types::WAITLIST_KEY;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub storage: StorageSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and health reporting
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Interface the HTTP server binds to
    pub host: String,
    /// Port for the registration API, health and metrics endpoints
    pub http_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Which key/value backend holds the waitlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::File => write!(f, "file"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            other => Err(anyhow!("Unknown storage backend: {}", other)),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Backend holding the waitlist
    pub backend: StorageBackend,
    /// Data directory for the file backend
    pub data_dir: PathBuf,
    /// Key the serialized waitlist is stored under
    pub waitlist_key: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "pesto-registration".to_string(),
            log_level: "info".to_string(),
            host: "0.0.0.0".to_string(),
            http_port: 8080,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data"),
            waitlist_key: WAITLIST_KEY.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still win
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse configuration from TOML text; missing fields take defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| anyhow!("Invalid TOML configuration: {}", e))
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(host) = env::var("HTTP_HOST") {
            self.service.host = host;
        }
        if let Ok(port) = env::var("HTTP_PORT") {
            self.service.http_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HTTP_PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            self.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Storage settings
        if let Ok(backend) = env::var("STORAGE_BACKEND") {
            self.storage.backend = backend.parse()?;
        }
        if let Ok(data_dir) = env::var("DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(key) = env::var("WAITLIST_KEY") {
            self.storage.waitlist_key = key;
        }

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Address string the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.host, self.service.http_port)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate listener
    if config.service.host.is_empty() {
        return Err(anyhow!("HTTP host cannot be empty"));
    }
    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }

    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }

    // Validate storage settings
    validate_key(&config.storage.waitlist_key)
        .map_err(|e| anyhow!("Invalid waitlist key: {}", e))?;
    if config.storage.backend == StorageBackend::File
        && config.storage.data_dir.as_os_str().is_empty()
    {
        return Err(anyhow!("Data directory cannot be empty for the file backend"));
    }

    Ok(())
}
