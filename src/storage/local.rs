use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use std::{
    collections::HashMap,
    io,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use super::{StorageAdapter, StorageError};
use crate::content::{ContentMap, parse_content};

/// Slot key used when no storage key is configured.
pub const DEFAULT_STORAGE_KEY: &str = "__editable_content__";

/// A synchronous string key-value slot, the shape of browser `localStorage`
/// and `sessionStorage`.
pub trait KeyValueSlot: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

// ── In-memory slot ────────────────────────────────────────────────────────────

/// Process-lifetime slot. Clones share the same underlying map, so two
/// handles behave like two tabs of one browser session.
#[derive(Clone, Default)]
pub struct MemorySlot {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueSlot for MemorySlot {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries
            .lock()
            .map_err(|_| io::Error::other("memory slot lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.entries
            .lock()
            .map_err(|_| io::Error::other("memory slot lock poisoned"))?
            .remove(key);
        Ok(())
    }
}

// ── File-backed slot ──────────────────────────────────────────────────────────

/// Slot persisting each key as `<dir>/<base64url(key)>.json`, for native
/// hosts that want edits to survive a restart.
#[derive(Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Lossless and filename-safe, so distinct keys never share a file.
        let name = URL_SAFE_NO_PAD.encode(key.as_bytes());
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueSlot for FileSlot {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

// ── Adapter ───────────────────────────────────────────────────────────────────

/// Storage adapter keeping the whole content map as JSON text in one slot.
pub struct LocalAdapter<S> {
    slot: S,
    key: String,
}

impl<S: KeyValueSlot> LocalAdapter<S> {
    pub fn new(slot: S) -> Self {
        Self::with_key(slot, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(slot: S, key: impl Into<String>) -> Self {
        Self {
            slot,
            key: key.into(),
        }
    }
}

#[async_trait]
impl<S: KeyValueSlot> StorageAdapter for LocalAdapter<S> {
    async fn load(&self) -> Result<ContentMap, StorageError> {
        Ok(parse_content(self.slot.get(&self.key).as_deref()))
    }

    async fn save(&self, content: &ContentMap) -> Result<(), StorageError> {
        let text = serde_json::to_string(content)?;
        self.slot.set(&self.key, &text)?;
        Ok(())
    }
}
