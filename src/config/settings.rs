//! TOML-based configuration for ancestry.
//!
//! Supports a config file (ancestry.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [connections.default]
//! driver = "sqlite"
//! path = "${APP_DB}"
//! name = "app"
//!
//! [graph]
//! collision_policy = "last_write_wins"
//! max_depth = 100
//!
//! [cache]
//! enabled = true
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::connection::{ConnectionConfig, Driver};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Named database connections.
    pub connections: HashMap<String, ConnectionSettings>,

    /// Graph inference and search settings.
    pub graph: GraphSettings,

    /// Schema graph cache settings.
    pub cache: CacheSettings,
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Database driver (sqlite).
    pub driver: String,

    /// Database path (supports ${ENV_VAR} expansion).
    pub path: String,

    /// Database name used to scope the cached graph.
    #[serde(default)]
    pub name: Option<String>,
}

impl ConnectionSettings {
    /// Get the driver type.
    pub fn driver_type(&self) -> Result<Driver, SettingsError> {
        Driver::from_str(&self.driver)
            .map_err(|_| SettingsError::UnsupportedDriver(self.driver.clone()))
    }

    /// Resolve into a connection config with environment variables expanded.
    pub fn to_connection_config(&self) -> Result<ConnectionConfig, SettingsError> {
        Ok(ConnectionConfig {
            driver: self.driver_type()?,
            path: expand_env_vars(&self.path)?,
            name: self.name.clone(),
        })
    }
}

/// What to do when two tables use the same primary-key column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The table enumerated last owns the column name.
    #[default]
    LastWriteWins,
    /// Refuse to build the graph.
    Reject,
}

/// Graph inference and search settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Primary-key collision policy.
    pub collision_policy: CollisionPolicy,

    /// Maximum join path length before a search is aborted as runaway.
    pub max_depth: usize,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            collision_policy: CollisionPolicy::LastWriteWins,
            max_depth: 100,
        }
    }
}

/// Schema graph cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Persist the schema graph between invocations.
    pub enabled: bool,

    /// Cache database path. Defaults to `~/.ancestry/cache.db`.
    pub path: Option<String>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl CacheSettings {
    /// The configured cache path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.path
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `ANCESTRY_CONFIG`
    /// 2. `./ancestry.toml`
    /// 3. `~/.config/ancestry/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("ANCESTRY_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("ancestry.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("ancestry").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.graph.max_depth == 0 {
            return Err(SettingsError::InvalidConfig(
                "graph.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> Result<&ConnectionSettings, SettingsError> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// Get the default connection (`default` if it exists, else the first by name).
    pub fn default_connection(&self) -> Option<(&str, &ConnectionSettings)> {
        if let Some(conn) = self.connections.get("default") {
            return Some(("default", conn));
        }
        self.connections
            .iter()
            .min_by(|a, b| a.0.cmp(b.0))
            .map(|(k, v)| (k.as_str(), v))
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                var_name.push(ch);
                chars.next();
            }
            if var_name.is_empty() {
                // Lone $
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
