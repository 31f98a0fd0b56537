use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{CacheResult, GraphStore};

/// Process-local graph store.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds whole entries.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl GraphStore for MemoryCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> CacheResult<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CacheResult<bool> {
        Ok(self.lock().remove(key).is_some())
    }
}
