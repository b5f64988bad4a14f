use std::collections::HashMap;
use std::sync::Mutex;

use eyre::Result;

/// Persisted key-value storage consumed by the availability store.
///
/// Implementations must degrade gracefully: a missing or unreadable key is
/// reported as `None`, never as an error. Write failures are returned so the
/// caller can log them, but no caller treats them as fatal.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: KvStore + ?Sized> KvStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// In-memory implementation, used by tests and as the fallback when no
/// persistent backend is configured.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("kv lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .expect("kv lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
