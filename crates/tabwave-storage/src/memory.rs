//! In-process store.

use crate::KeyValueStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tabwave_core::{TabwaveError, TabwaveResult};

/// Map-backed store. Clones share the same map, so a test can keep one
/// handle while the shell owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }

    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> TabwaveResult<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| TabwaveError::storage("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> TabwaveResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> TabwaveResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> TabwaveResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let handle = MemoryStore::new();
        let mut writer = handle.clone();
        writer.set("state", "{}").unwrap();

        assert_eq!(handle.get("state").unwrap().as_deref(), Some("{}"));
        assert_eq!(handle.len(), 1);

        writer.remove("state").unwrap();
        assert!(handle.is_empty());
    }

    #[test]
    fn test_missing_key() {
        let store = MemoryStore::with_entry("a", "1");
        assert_eq!(store.get("b").unwrap(), None);
    }
}
