//! Process-local key-value surface.

use super::{KvStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// `HashMap`-backed surface. Writes can be switched off to simulate a full
/// or read-only backend.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
    reject_writes: Mutex<bool>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a surface pre-populated with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::default();
        store
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
        store
    }

    /// When `true`, every subsequent `set` fails with `Unavailable`.
    pub fn set_reject_writes(&self, reject: bool) {
        *self
            .reject_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = reject;
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if *self
            .reject_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
        {
            return Err(StorageError::Unavailable(format!(
                "writes rejected for key `{key}`"
            )));
        }
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKvStore;
    use crate::storage::{KvStore, StorageError};

    #[test]
    fn get_returns_none_for_unknown_key() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get("users").unwrap(), None);
    }

    #[test]
    fn set_overwrites_previous_value() {
        let store = MemoryKvStore::with_entry("users", "[]");
        store.set("users", "[1]").unwrap();
        assert_eq!(store.get("users").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn rejected_writes_leave_value_untouched() {
        let store = MemoryKvStore::with_entry("users", "[]");
        store.set_reject_writes(true);

        let err = store.set("users", "[1]").unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        assert_eq!(store.get("users").unwrap().as_deref(), Some("[]"));
    }
}
