//! File-backed key-value store for availability state.
//!
//! One JSON object per file. A missing or unparsable file reads as empty so
//! the availability store can fall back to its default generation; every
//! write rewrites the whole file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use eyre::{Result, WrapErr};
use slotbook_core::kv::KvStore;
use tracing::warn;

pub struct FileKvStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileKvStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn load_entries(path: &Path) -> HashMap<String, String> {
    match std::fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %path.display(), %err, "state file unparsable, starting empty");
                HashMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
        Err(err) => {
            warn!(path = %path.display(), %err, "state file unreadable, starting empty");
            HashMap::new()
        }
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("kv lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().expect("kv lock poisoned");
        entries.insert(key.to_string(), value.to_string());
        let raw = serde_json::to_string_pretty(&*entries)?;
        std::fs::write(&self.path, raw)
            .wrap_err_with(|| format!("writing state file {}", self.path.display()))
    }
}
