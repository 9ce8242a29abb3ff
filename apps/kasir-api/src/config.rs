//! # Server Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority, .env loaded first)        │
//! │     HOST, PORT, DATABASE_PATH, DB_MAX_CONNECTIONS                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $KASIR_CONFIG, or ./kasir.toml when unset                          │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     0.0.0.0:8080, ./kasir.db, 5 connections                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [database]
//! path = "/var/lib/kasir/kasir.db"
//! max_connections = 8
//! ```

use kasir_db::DbConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

/// Config file used when `KASIR_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "kasir.toml";

// =============================================================================
// Errors
// =============================================================================

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Sections
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// SQLite settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file, created on first start.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("kasir.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// App Configuration
// =============================================================================

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseSettings,
}

impl AppConfig {
    /// Loads configuration from file, process environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`path`, else `$KASIR_CONFIG`, else `kasir.toml`)
    /// 3. Environment variables
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load`] with an injectable environment lookup.
    pub fn load_with<F>(path: Option<PathBuf>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path
            .or_else(|| env("KASIR_CONFIG").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            info!(?path, "Loading config from file");
            let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&contents)?
        } else {
            debug!(?path, "Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides(&env)?;
        config.validate()?;

        Ok(config)
    }

    /// Rejects settings the server cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host must not be empty".into()));
        }

        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be greater than 0".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides<F>(&mut self, env: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = env("HOST") {
            debug!(host = %host, "Overriding host from environment");
            self.server.host = host;
        }

        if let Some(port) = env("PORT") {
            self.server.port = parse_var("PORT", &port)?;
        }

        if let Some(path) = env("DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = env("DB_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DB_MAX_CONNECTIONS", &max)?;
        }

        Ok(())
    }

    /// `host:port` for the TCP listener.
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Pool configuration for [`kasir_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn missing_file() -> Option<PathBuf> {
        Some(PathBuf::from("/nonexistent/kasir-test.toml"))
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::load_with(missing_file(), env_of(&[])).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.server_address(), "0.0.0.0:8080");
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::load_with(
            missing_file(),
            env_of(&[
                ("HOST", "127.0.0.1"),
                ("PORT", "3000"),
                ("DATABASE_PATH", "/tmp/kasir.db"),
                ("DB_MAX_CONNECTIONS", "9"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server_address(), "127.0.0.1:3000");
        assert_eq!(config.database.path, PathBuf::from("/tmp/kasir.db"));

        let db = config.db_config();
        assert_eq!(db.max_connections, 9);
    }

    #[test]
    fn test_invalid_env_value() {
        let err = AppConfig::load_with(missing_file(), env_of(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PORT"));
    }

    #[test]
    fn test_zero_port_rejected() {
        let err = AppConfig::load_with(missing_file(), env_of(&[("PORT", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_toml_file_then_env() {
        let path = std::env::temp_dir().join(format!("kasir-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[server]\nport = 9090\n\n[database]\npath = \"data/shop.db\"\n",
        )
        .unwrap();

        let config = AppConfig::load_with(
            None,
            env_of(&[
                ("KASIR_CONFIG", path.to_str().unwrap()),
                ("HOST", "10.0.0.5"),
            ]),
        )
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "10.0.0.5");
        assert_eq!(config.database.path, PathBuf::from("data/shop.db"));
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_malformed_toml() {
        let path = std::env::temp_dir().join(format!("kasir-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[server\nport = ").unwrap();

        let err = AppConfig::load_with(Some(path.clone()), env_of(&[])).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
