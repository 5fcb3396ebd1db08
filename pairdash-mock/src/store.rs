use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use pairdash_core::{DashError, PersistenceStore};

/// In-memory key/value store. Clones share the same entries.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one raw entry.
    #[must_use]
    pub fn with_entry(key: &str, raw: &str) -> Self {
        let me = Self::new();
        me.put_raw(key, raw);
        me
    }

    /// Overwrite `key` with a raw string, bypassing `fail_writes`.
    pub fn put_raw(&self, key: &str, raw: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), raw.to_string());
    }

    /// Raw value currently stored under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Make every subsequent `set` fail with `Persistence`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, DashError> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DashError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DashError::Persistence(format!("write rejected for {key}")));
        }
        self.put_raw(key, value);
        Ok(())
    }
}
