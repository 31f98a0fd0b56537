use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use super::{CacheError, CacheResult, GraphStore};

/// Current cache schema version. Bump this when the stored graph format changes.
const CACHE_VERSION: i32 = 1;

/// SQLite-backed graph store.
pub struct SqliteCache {
    conn: Connection,
}

impl SqliteCache {
    /// Open or create the cache at the default location.
    ///
    /// The cache is stored at `~/.ancestry/cache.db`.
    /// If the cache version doesn't match, it's automatically cleared.
    pub fn open() -> CacheResult<Self> {
        Self::open_at(Self::default_path()?)
    }

    /// Open or create the cache at `path`.
    pub fn open_at(path: impl AsRef<Path>) -> CacheResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let cache = Self {
            conn: Connection::open(path)?,
        };
        cache.init()?;
        Ok(cache)
    }

    /// Open an in-memory cache (for testing).
    pub fn open_in_memory() -> CacheResult<Self> {
        let cache = Self {
            conn: Connection::open_in_memory()?,
        };
        cache.init()?;
        Ok(cache)
    }

    /// Get the default path of the cache database.
    pub fn default_path() -> CacheResult<PathBuf> {
        let base = dirs::home_dir().ok_or(CacheError::NoCacheDir)?;
        Ok(base.join(".ancestry").join("cache.db"))
    }

    /// Initialize the cache schema and check version.
    fn init(&self) -> CacheResult<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        let stored_version: Option<i32> = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
                let s: String = row.get(0)?;
                Ok(s.parse().unwrap_or(0))
            })
            .optional()?;

        match stored_version {
            Some(v) if v == CACHE_VERSION => {}
            Some(v) => {
                log::info!("cache version {} is stale, clearing", v);
                self.clear_all()?;
                self.set_version()?;
            }
            None => self.set_version()?,
        }

        Ok(())
    }

    fn set_version(&self) -> CacheResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('version', ?)",
            params![CACHE_VERSION.to_string()],
        )?;
        Ok(())
    }

    /// Clear all cache entries (but keep metadata).
    pub fn clear_all(&self) -> CacheResult<usize> {
        Ok(self.conn.execute("DELETE FROM cache", [])?)
    }

    /// Number of stored entries.
    pub fn entry_count(&self) -> CacheResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl GraphStore for SqliteCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM cache WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn put(&self, key: &str, value: &str) -> CacheResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO cache (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> CacheResult<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM cache WHERE key = ?", params![key])?;
        Ok(rows > 0)
    }
}
