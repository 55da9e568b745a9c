//! Persisted key/value slots for access tokens.
//!
//! A store models one origin's durable storage: every handle pointing at the
//! same backing data observes the same slots. Concurrent writers of one slot
//! overwrite each other (last write wins); writing one slot never disturbs
//! another. Implementations never cache reads, so a value written by one
//! handle is visible to the next `get` on any other.

use crate::access::error::StoreError;
use fs2::FileExt;
use serde_json::{Map, Value};
use std::{
    collections::HashMap,
    fs::{self, File, OpenOptions},
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Slot holding the single temporary page grant.
pub const TEMP_ACCESS_TOKEN_KEY: &str = "temp_access_token";
/// Slot holding the long-lived login token.
pub const SESSION_TOKEN_KEY: &str = "token";

pub trait TokenStore: Send + Sync {
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value held under `key`. Once this returns `Ok`, later reads
    /// through any handle observe the new value.
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing an absent key is not an error.
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: TokenStore + ?Sized> TokenStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-process store. Clones share the same slots.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore {
    slots: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let slots = self.slots.read().map_err(|_| StoreError::Poisoned)?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.write().map_err(|_| StoreError::Poisoned)?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.write().map_err(|_| StoreError::Poisoned)?;
        slots.remove(key);
        Ok(())
    }
}

/// JSON object file holding every slot of one origin.
///
/// Writers serialize on an exclusive `flock` of a sibling `.{name}.lock` file
/// for the whole read-modify-write, so processes updating different slots do
/// not drop each other's changes. Readers take no lock; the rename in `save`
/// keeps every read consistent.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        Ok(serde_json::from_str(&raw)?)
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map_or_else(|| "store".into(), |name| name.to_string_lossy());
        self.path.with_file_name(format!(".{file_name}.{suffix}"))
    }

    fn ensure_parent(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Blocks until this handle holds the writer lock. Released on drop.
    fn lock(&self) -> Result<File, StoreError> {
        self.ensure_parent()?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.sibling("lock"))?;
        file.lock_exclusive()?;
        Ok(file)
    }

    // Write to a sibling file and rename it into place so readers never see a
    // partially written document.
    fn save(&self, slots: &Map<String, Value>) -> Result<(), StoreError> {
        self.ensure_parent()?;
        let tmp = self.sibling(&format!("{}.tmp", Uuid::new_v4()));

        let body = serde_json::to_vec_pretty(slots)?;
        fs::write(&tmp, body)?;
        if let Err(err) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }

        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let slots = self.load()?;
        Ok(slots.get(key).and_then(Value::as_str).map(str::to_string))
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let mut slots = self.load()?;
        slots.insert(key.to_string(), Value::String(value.to_string()));
        self.save(&slots)?;
        debug!("slot written");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if !self.path.exists() {
            return Ok(());
        }
        let _guard = self.lock()?;
        let mut slots = self.load()?;
        if slots.remove(key).is_none() {
            return Ok(());
        }
        self.save(&slots)?;
        debug!("slot cleared");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::{env, thread};

    fn temp_store_path() -> PathBuf {
        env::temp_dir()
            .join(format!("pagegate-store-{}", Uuid::new_v4()))
            .join("origin.json")
    }

    #[test]
    fn memory_store_clones_share_slots() {
        let store = MemoryTokenStore::new();
        let other_tab = store.clone();

        store.set(TEMP_ACCESS_TOKEN_KEY, "first").unwrap();
        assert_eq!(
            other_tab.get(TEMP_ACCESS_TOKEN_KEY).unwrap().as_deref(),
            Some("first")
        );

        other_tab.set(TEMP_ACCESS_TOKEN_KEY, "second").unwrap();
        assert_eq!(
            store.get(TEMP_ACCESS_TOKEN_KEY).unwrap().as_deref(),
            Some("second")
        );
    }

    #[test]
    fn memory_store_remove_is_idempotent() {
        let store = MemoryTokenStore::new();
        store.set(TEMP_ACCESS_TOKEN_KEY, "value").unwrap();
        store.remove(TEMP_ACCESS_TOKEN_KEY).unwrap();
        store.remove(TEMP_ACCESS_TOKEN_KEY).unwrap();
        assert_eq!(store.get(TEMP_ACCESS_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_missing_file_reads_as_empty() {
        let store = FileTokenStore::new(temp_store_path());
        assert_eq!(store.get(TEMP_ACCESS_TOKEN_KEY).unwrap(), None);
        store.remove(TEMP_ACCESS_TOKEN_KEY).unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn file_store_keeps_slots_independent() {
        let path = temp_store_path();
        let store = FileTokenStore::new(&path);

        store.set(SESSION_TOKEN_KEY, "session").unwrap();
        store.set(TEMP_ACCESS_TOKEN_KEY, "grant").unwrap();
        store.remove(TEMP_ACCESS_TOKEN_KEY).unwrap();

        let reopened = FileTokenStore::new(&path);
        assert_eq!(
            reopened.get(SESSION_TOKEN_KEY).unwrap().as_deref(),
            Some("session")
        );
        assert_eq!(reopened.get(TEMP_ACCESS_TOKEN_KEY).unwrap(), None);

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn file_store_writers_of_different_slots_do_not_clobber_each_other() {
        let path = temp_store_path();

        for round in 0..50 {
            let grants = FileTokenStore::new(&path);
            let sessions = FileTokenStore::new(&path);
            let session = format!("session-{round}");

            let churn = thread::spawn(move || {
                for _ in 0..20 {
                    grants.set(TEMP_ACCESS_TOKEN_KEY, "grant").unwrap();
                    grants.remove(TEMP_ACCESS_TOKEN_KEY).unwrap();
                }
            });
            let login = {
                let session = session.clone();
                thread::spawn(move || sessions.set(SESSION_TOKEN_KEY, &session).unwrap())
            };
            churn.join().unwrap();
            login.join().unwrap();

            let reader = FileTokenStore::new(&path);
            assert_eq!(
                reader.get(SESSION_TOKEN_KEY).unwrap(),
                Some(session),
                "round {round}"
            );
            assert_eq!(reader.get(TEMP_ACCESS_TOKEN_KEY).unwrap(), None);
        }

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn file_store_last_write_wins_across_handles() {
        let path = temp_store_path();
        let tab_a = FileTokenStore::new(&path);
        let tab_b = FileTokenStore::new(&path);

        tab_a.set(TEMP_ACCESS_TOKEN_KEY, "grant-for-users").unwrap();
        tab_b.set(TEMP_ACCESS_TOKEN_KEY, "grant-for-finance").unwrap();

        assert_eq!(
            tab_a.get(TEMP_ACCESS_TOKEN_KEY).unwrap().as_deref(),
            Some("grant-for-finance")
        );

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn file_store_reports_corrupt_documents() {
        let path = temp_store_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();

        let store = FileTokenStore::new(&path);
        assert!(matches!(
            store.get(TEMP_ACCESS_TOKEN_KEY),
            Err(StoreError::Corrupt(_))
        ));

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
