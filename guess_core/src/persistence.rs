use std::{
    cell::RefCell,
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    rc::Rc,
};

use guess_schema::{decode_session_json, encode_session_json, ChainSessionSnapshot};
use thiserror::Error;

use crate::config::PersistenceConfig;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
    #[error("session store io failure at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Durable key-value slot storage.
pub trait SessionStore {
    fn persist(&mut self, key: &str, payload: &str) -> Result<(), StoreError>;
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn clear(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct MemorySlots {
    slots: HashMap<String, String>,
    failing_writes: bool,
}

/// Process-local store. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemorySlots>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail; reads and clears still work.
    pub fn failing_writes() -> Self {
        let store = Self::default();
        store.inner.borrow_mut().failing_writes = true;
        store
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.borrow().slots.contains_key(key)
    }
}

impl SessionStore for MemoryStore {
    fn persist(&mut self, key: &str, payload: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        if inner.failing_writes {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        inner.slots.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.borrow().slots.get(key).cloned())
    }

    fn clear(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner.borrow_mut().slots.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per slot under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl SessionStore for FileStore {
    fn persist(&mut self, key: &str, payload: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.slot_path(key);
        fs::write(&path, payload).map_err(|source| StoreError::Io { path, source })
    }

    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn clear(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.slot_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

/// Single-slot checkpointing of a chain session with a time-to-live.
///
/// Every failure here is best-effort: writes and clears log a warning, and
/// anything unreadable on load behaves as "no resumable session".
pub struct SessionPersistence {
    store: Box<dyn SessionStore>,
    slot_key: String,
    ttl_ms: u64,
}

impl SessionPersistence {
    pub fn new(store: Box<dyn SessionStore>, config: &PersistenceConfig) -> Self {
        Self {
            store,
            slot_key: config.slot_key.clone(),
            ttl_ms: config.ttl_secs.saturating_mul(1_000),
        }
    }

    pub fn slot_key(&self) -> &str {
        &self.slot_key
    }

    /// Writes the snapshot to the slot. Terminal snapshots clear it instead.
    pub fn save(&mut self, snapshot: &ChainSessionSnapshot) {
        if snapshot.terminal {
            self.clear();
            return;
        }
        let payload = match encode_session_json(snapshot) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(
                    target: "anime_guess::persistence",
                    slot = %self.slot_key,
                    error = %err,
                    "persistence.encode_failed"
                );
                return;
            }
        };
        match self.store.persist(&self.slot_key, &payload) {
            Ok(()) => tracing::debug!(
                target: "anime_guess::persistence",
                slot = %self.slot_key,
                rounds = snapshot.rounds_completed,
                "persistence.saved"
            ),
            Err(err) => tracing::warn!(
                target: "anime_guess::persistence",
                slot = %self.slot_key,
                error = %err,
                "persistence.save_failed"
            ),
        }
    }

    /// Returns the resumable session, if any. Corrupted, expired and terminal
    /// payloads are discarded and the slot is cleared.
    pub fn load(&mut self, now_ms: u64) -> Option<ChainSessionSnapshot> {
        let payload = match self.store.load(&self.slot_key) {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(
                    target: "anime_guess::persistence",
                    slot = %self.slot_key,
                    error = %err,
                    "persistence.load_failed"
                );
                return None;
            }
        };

        let snapshot = match decode_session_json(&payload) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::debug!(
                    target: "anime_guess::persistence",
                    slot = %self.slot_key,
                    error = %err,
                    "persistence.discarded_corrupt"
                );
                self.clear();
                return None;
            }
        };

        if snapshot.terminal {
            tracing::debug!(
                target: "anime_guess::persistence",
                slot = %self.slot_key,
                "persistence.discarded_terminal"
            );
            self.clear();
            return None;
        }

        // Future timestamps (clock skew) count as age zero.
        let age_ms = now_ms.saturating_sub(snapshot.saved_at_ms);
        if age_ms > self.ttl_ms {
            tracing::debug!(
                target: "anime_guess::persistence",
                slot = %self.slot_key,
                age_ms,
                "persistence.discarded_expired"
            );
            self.clear();
            return None;
        }

        Some(snapshot)
    }

    pub fn clear(&mut self) {
        if let Err(err) = self.store.clear(&self.slot_key) {
            tracing::warn!(
                target: "anime_guess::persistence",
                slot = %self.slot_key,
                error = %err,
                "persistence.clear_failed"
            );
        }
    }
}

impl std::fmt::Debug for SessionPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPersistence")
            .field("slot_key", &self.slot_key)
            .field("ttl_ms", &self.ttl_ms)
            .finish_non_exhaustive()
    }
}
