//! In-memory key-value persistence.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::PersistenceError;
use crate::ports::PersistenceAdapter;

/// Snapshot storage held in process memory.
///
/// Clones share the same storage, so a test can keep one clone to inspect
/// what the session wrote.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPersistence {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryPersistence {
    /// Creates empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `key` with `bytes`.
    pub fn with_entry(self, key: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.lock().insert(key.into(), bytes);
        self
    }

    /// Returns what is stored under `key`.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().get(key).cloned()
    }

    /// Makes every subsequent `save` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A panic while holding the lock can't leave the map half-written.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PersistenceAdapter for InMemoryPersistence {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Write("writes disabled".to_string()));
        }

        self.lock().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
