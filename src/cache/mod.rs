//! Persistence for the serialized schema graph.
//!
//! The core only needs an opaque key/value store ([`GraphStore`]). Two
//! implementations ship with the crate:
//!
//! - [`SqliteCache`] - a versioned SQLite file, by default `~/.ancestry/cache.db`
//! - [`MemoryCache`] - a process-local map, cloneable to share between sessions
//!
//! # Design
//!
//! - No TTL: an entry persists until explicitly removed
//! - One graph per database name (see [`CacheKey::schema_graph`])
//! - Concurrent writers race; the last `put` wins
//!
//! # Key Format
//!
//! ```text
//! schema_graph:{database_name}   -> [TableDescriptor, ...] (JSON)
//! ```

mod hash;
mod memory;
mod sqlite;

pub use hash::{compute_hash, hash_str};
pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to determine cache directory")]
    NoCacheDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Opaque key/value persistence for serialized graphs.
pub trait GraphStore {
    /// Fetch a stored value.
    fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store a value, replacing any previous one.
    fn put(&self, key: &str, value: &str) -> CacheResult<()>;

    /// Remove a value. Returns true if something was removed.
    fn remove(&self, key: &str) -> CacheResult<bool>;
}

impl<T: GraphStore + ?Sized> GraphStore for Box<T> {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> CacheResult<()> {
        (**self).put(key, value)
    }

    fn remove(&self, key: &str) -> CacheResult<bool> {
        (**self).remove(key)
    }
}

/// Helper for generating cache keys.
pub struct CacheKey;

impl CacheKey {
    /// Key for the schema graph of a database.
    pub fn schema_graph(database: &str) -> String {
        format!("schema_graph:{}", database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_graph_key() {
        assert_eq!(CacheKey::schema_graph("shop"), "schema_graph:shop");
    }

    #[test]
    fn test_boxed_store_delegates() {
        let store: Box<dyn GraphStore> = Box::new(MemoryCache::new());
        store.put("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert!(store.remove("k").unwrap());
        assert!(store.get("k").unwrap().is_none());
    }
}
