// SPDX-License-Identifier: MPL-2.0

use crate::cache::CacheError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Synchronous string key-value storage, the local persistence seam.
///
/// Implementations are handed to consumers explicitly; nothing reaches for a
/// process-wide store.
pub trait KeyValueStore: Send + Sync {
    /// Get the raw value for a key, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Insert or replace a value.
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Delete a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// Process-local store, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.lock().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.map.lock().expect("store lock poisoned").get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.map
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.map.lock().expect("store lock poisoned").remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get("a").unwrap().is_none());

        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }
}
