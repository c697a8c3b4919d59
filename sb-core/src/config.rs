//! Application configuration management.
//!
//! Handles loading, saving, and accessing the client configuration: where
//! the backend lives, how the realtime channel reconnects, where logs and
//! session tokens are kept. Configuration is persisted as TOML on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{SbError, SbResult};
use crate::platform::Platform;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend connection settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Realtime offer channel settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Session token persistence.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Backend connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Backend origin, e.g. "http://localhost:8000".
    #[serde(default = "default_address")]
    pub address: String,

    /// Explicit realtime channel URL. Derived from `address` when empty.
    #[serde(default)]
    pub realtime_url: String,

    /// API request timeout in milliseconds.
    #[serde(default = "default_api_timeout")]
    pub api_timeout_ms: u64,

    /// Accept invalid TLS certificates (development backends only).
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

/// Realtime channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Fixed delay between reconnection attempts, in milliseconds.
    #[serde(default = "default_reconnect_interval")]
    pub reconnect_interval_ms: u64,

    /// Buffer size of the inbound event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses default location.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output.
    #[serde(default)]
    pub json_output: bool,
}

/// Session persistence configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Path of the token file. If empty, uses default location.
    #[serde(default)]
    pub token_file: String,
}

// Default value functions for serde

fn default_address() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_timeout() -> u64 {
    constants::DEFAULT_API_TIMEOUT_MS
}

fn default_reconnect_interval() -> u64 {
    constants::DEFAULT_RECONNECT_INTERVAL_MS
}

fn default_event_capacity() -> usize {
    constants::DEFAULT_EVENT_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            realtime_url: String::new(),
            api_timeout_ms: default_api_timeout(),
            accept_invalid_certs: false,
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            reconnect_interval_ms: default_reconnect_interval(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl RealtimeConfig {
    /// Reconnect interval as a Duration.
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }
}

impl AppConfig {
    /// Load configuration from the default config file path.
    pub fn load_default() -> SbResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> SbResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break the services built from this config.
    pub fn validate(&self) -> SbResult<()> {
        if self.realtime.event_capacity == 0 {
            return Err(SbError::Config(
                "realtime.event_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> SbResult<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| SbError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> SbResult<PathBuf> {
        Ok(Platform::config_dir()?.join("config.toml"))
    }

    /// Get the effective log directory, using the configured path or the default.
    pub fn effective_log_dir(&self) -> SbResult<PathBuf> {
        if self.logging.directory.is_empty() {
            Ok(Platform::data_dir()?.join("logs"))
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Get the effective token file path.
    pub fn effective_token_file(&self) -> SbResult<PathBuf> {
        if self.session.token_file.is_empty() {
            Ok(Platform::data_dir()?.join(constants::TOKEN_FILE_NAME))
        } else {
            Ok(PathBuf::from(&self.session.token_file))
        }
    }

    /// The realtime channel URL: the explicit setting, or one derived from
    /// the server address (`http` becomes `ws`, `https` becomes `wss`).
    pub fn realtime_url(&self) -> SbResult<String> {
        if !self.server.realtime_url.is_empty() {
            return Ok(self.server.realtime_url.clone());
        }
        let address = Self::sanitize_server_address(&self.server.address);
        if address.is_empty() {
            return Err(SbError::MissingConfig("server address".into()));
        }
        let ws = if let Some(rest) = address.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = address.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            return Err(SbError::Config(format!("unsupported address scheme: {address}")));
        };
        Ok(format!("{ws}{}", constants::REALTIME_PATH))
    }

    /// Sanitize and normalize a server address.
    ///
    /// Ensures the address has a scheme and strips quotes and trailing slashes.
    pub fn sanitize_server_address(address: &str) -> String {
        let trimmed = address.trim().trim_matches('"').trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };

        with_scheme.trim_end_matches('/').to_string()
    }
}

/// Thread-safe configuration holder for shared access across services.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<AppConfig>>,
}

impl ConfigHandle {
    /// Create a new configuration handle.
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Read the configuration.
    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.read().await
    }

    /// Write/update the configuration.
    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, AppConfig> {
        self.inner.write().await
    }
}
