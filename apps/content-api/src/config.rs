//! # API Configuration
//!
//! Configuration management for the content API.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     LINGUA_PORT=8080                                                   │
//! │     LINGUA_DATABASE_PATH=/var/lib/lingua/lingua.db                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/lingua-content/api.toml (Linux)                          │
//! │     ~/Library/Application Support/com.lingua.content/api.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     127.0.0.1:8080, data-dir lingua.db, 60s transaction timeout        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # api.toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "/var/lib/lingua/lingua.db"
//! max_connections = 5
//! transaction_timeout_secs = 60
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use lingua_db::DbConfig;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Server Settings
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address (default: 127.0.0.1, the editor runs locally).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

// =============================================================================
// Database Settings
// =============================================================================

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file. Defaults to `lingua.db` in the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Maximum pool connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Budget for one module synchronization (seconds).
    #[serde(default = "default_transaction_timeout")]
    pub transaction_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_transaction_timeout() -> u64 {
    60
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
            transaction_timeout_secs: default_transaction_timeout(),
        }
    }
}

// =============================================================================
// Main API Configuration
// =============================================================================

/// Complete API configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,
}

impl ApiConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (api.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading API config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.bind_addr.trim().is_empty() {
            return Err(ConfigError::Invalid("bind_addr must not be empty".into()));
        }

        if self.server.port == 0 {
            return Err(ConfigError::Invalid("port must be greater than 0".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.database.transaction_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "transaction_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies overrides from `lookup`, keyed by environment variable name.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("LINGUA_BIND_ADDR") {
            debug!(addr = %addr, "Overriding bind address from environment");
            self.server.bind_addr = addr;
        }

        if let Some(port) = lookup("LINGUA_PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => warn!(port = %port, "Ignoring invalid LINGUA_PORT"),
            }
        }

        if let Some(path) = lookup("LINGUA_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(max) = lookup("LINGUA_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(m) => self.database.max_connections = m,
                Err(_) => warn!(max = %max, "Ignoring invalid LINGUA_MAX_CONNECTIONS"),
            }
        }

        if let Some(secs) = lookup("LINGUA_TX_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.database.transaction_timeout_secs = s,
                Err(_) => warn!(secs = %secs, "Ignoring invalid LINGUA_TX_TIMEOUT_SECS"),
            }
        }
    }

    /// Returns the database file path, falling back to the data directory.
    pub fn database_path(&self) -> PathBuf {
        if let Some(ref path) = self.database.path {
            return path.clone();
        }

        directories::ProjectDirs::from("com", "lingua", "content")
            .map(|dirs| dirs.data_dir().join("lingua.db"))
            .unwrap_or_else(|| PathBuf::from("./lingua.db"))
    }

    /// Builds the storage configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path())
            .max_connections(self.database.max_connections)
            .transaction_timeout(Duration::from_secs(self.database.transaction_timeout_secs))
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "lingua", "content")
            .map(|dirs| dirs.config_dir().join("api.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.server.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.database.transaction_timeout_secs, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_file() {
        let config: ApiConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [database]
            path = "/tmp/lingua.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_addr, "127.0.0.1");
        assert_eq!(config.database_path(), PathBuf::from("/tmp/lingua.db"));
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LINGUA_PORT", "9100"),
            ("LINGUA_DATABASE_PATH", "/data/x.db"),
            ("LINGUA_TX_TIMEOUT_SECS", "5"),
            ("LINGUA_MAX_CONNECTIONS", "many"),
        ]);

        let mut config = ApiConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.database_path(), PathBuf::from("/data/x.db"));
        assert_eq!(config.database.transaction_timeout_secs, 5);
        // Unparseable values keep the previous setting
        assert_eq!(config.database.max_connections, 5);

        let db = config.db_config();
        assert_eq!(db.transaction_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_validation() {
        let mut config = ApiConfig::default();
        config.database.transaction_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ApiConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }
}
