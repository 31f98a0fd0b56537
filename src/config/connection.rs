//! Database connection configuration.
//!
//! Supports configuration via environment variables:
//! - `ANCESTRY_DB_DRIVER`: Database driver (sqlite)
//! - `ANCESTRY_DB_PATH`: Database file path, or `:memory:`
//! - `ANCESTRY_DB_NAME`: Database name (optional, derived from the file path)

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::hash_str;

/// Error type for connection configuration and connection establishment.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported driver: {0}. Supported: sqlite")]
    UnsupportedDriver(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to open database '{path}': {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Connection to in-memory database lost and cannot be reopened")]
    InMemoryLost,
}

/// Supported database drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// SQLite (file or in-memory)
    Sqlite,
}

impl Driver {
    /// Parse driver from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConnectionError> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            other => Err(ConnectionError::UnsupportedDriver(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Sqlite => "sqlite",
        }
    }
}

/// Database connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Database driver.
    pub driver: Driver,
    /// File path, or `:memory:`.
    pub path: String,
    /// Database name. Scopes the cached schema graph.
    pub name: Option<String>,
}

impl ConnectionConfig {
    /// Create a new connection config for an SQLite file.
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            driver: Driver::Sqlite,
            path: path.into(),
            name: None,
        }
    }

    /// Create a new connection config for a private in-memory SQLite database.
    pub fn sqlite_in_memory() -> Self {
        Self::sqlite(":memory:")
    }

    /// Set the database name used for cache scoping.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `ANCESTRY_DB_DRIVER`: sqlite
    /// - `ANCESTRY_DB_PATH`: file path or `:memory:`
    ///
    /// Optional:
    /// - `ANCESTRY_DB_NAME`: database name
    pub fn from_env() -> Result<Self, ConnectionError> {
        let driver_str = env::var("ANCESTRY_DB_DRIVER")
            .map_err(|_| ConnectionError::MissingEnvVar("ANCESTRY_DB_DRIVER".to_string()))?;

        let driver = Driver::from_str(&driver_str)?;

        let path = env::var("ANCESTRY_DB_PATH")
            .map_err(|_| ConnectionError::MissingEnvVar("ANCESTRY_DB_PATH".to_string()))?;

        if path.trim().is_empty() {
            return Err(ConnectionError::InvalidConfig(
                "ANCESTRY_DB_PATH is empty".to_string(),
            ));
        }

        Ok(Self {
            driver,
            path,
            name: env::var("ANCESTRY_DB_NAME").ok(),
        })
    }

    /// Whether this connection points at a private in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.path.is_empty() || self.path == ":memory:"
    }

    /// The database name.
    ///
    /// The configured name wins. A file database is otherwise named by its
    /// stem plus a short hash of its absolute path, so `a/shop.db` and
    /// `b/shop.db` never share a cached graph. An unnamed in-memory config
    /// is `main`.
    pub fn database_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        if self.is_in_memory() {
            return "main".to_string();
        }

        let path = Path::new(&self.path);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "main".to_string());
        let absolute = match (path.parent(), path.file_name()) {
            (Some(parent), Some(file)) => absolute_dir(parent).join(file),
            _ => path.to_path_buf(),
        };
        let digest = hash_str(&absolute.to_string_lossy());
        format!("{}-{}", stem, &digest[..12])
    }
}

/// Canonical form of a directory, falling back to joining it onto the
/// working directory when it cannot be resolved.
fn absolute_dir(dir: &Path) -> PathBuf {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    fs::canonicalize(dir)
        .or_else(|_| env::current_dir().map(|cwd| cwd.join(dir)))
        .unwrap_or_else(|_| dir.to_path_buf())
}
