use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::document::ConfigDocument;

/// Errors that can occur during configuration persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize configuration: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write configuration: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

const AUTOSAVE_PREFIX: &str = "autosave_";

/// Where the documents of a [`ConfigStore`] live
#[derive(Debug, Clone)]
enum Backend {
    /// One `<key>.json` file per document
    Directory(PathBuf),
    /// Serialized documents by key. The host persists them, e.g. through
    /// `eframe::Storage` on the web where there is no file system.
    Memory(BTreeMap<String, String>),
}

/// Key-value storage of configuration documents.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    backend: Backend,
    /// Maximum number of auto-save documents to keep
    max_autosaves: usize,
    /// Interval between auto-saves in seconds, `None` while disabled
    autosave_interval: Option<u64>,
    /// Last auto-save timestamp
    last_autosave: u64,
}

impl ConfigStore {
    /// Create a new store rooted at `dir`. Auto-save starts disabled.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_backend(Backend::Directory(dir.into()))
    }

    /// A store holding `entries` (serialized documents by key) in memory.
    /// Read them back with [`ConfigStore::entries`] to persist them.
    pub fn in_memory(entries: BTreeMap<String, String>) -> Self {
        Self::with_backend(Backend::Memory(entries))
    }

    fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            max_autosaves: 5,
            autosave_interval: None,
            last_autosave: 0,
        }
    }

    pub fn with_max_autosaves(mut self, max_autosaves: usize) -> Self {
        self.max_autosaves = max_autosaves.max(1);
        self
    }

    /// Store directory, `None` for an in-memory store
    pub fn dir(&self) -> Option<&Path> {
        match &self.backend {
            Backend::Directory(dir) => Some(dir),
            Backend::Memory(_) => None,
        }
    }

    /// Everything held by an in-memory store, `None` for a directory store
    pub fn entries(&self) -> Option<&BTreeMap<String, String>> {
        match &self.backend {
            Backend::Directory(_) => None,
            Backend::Memory(entries) => Some(entries),
        }
    }

    fn validate_key(key: &str) -> PersistenceResult<()> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if valid {
            Ok(())
        } else {
            Err(PersistenceError::InvalidKey(key.to_owned()))
        }
    }

    fn path_for(dir: &Path, key: &str) -> PersistenceResult<PathBuf> {
        Self::validate_key(key)?;
        Ok(dir.join(format!("{}.json", key)))
    }

    /// Save a configuration under `key`, replacing what was there
    pub fn save(&mut self, key: &str, document: &ConfigDocument) -> PersistenceResult<()> {
        Self::validate_key(key)?;
        let json = serde_json::to_string_pretty(document)?;

        match &mut self.backend {
            Backend::Directory(dir) => {
                let path = Self::path_for(dir, key)?;
                // Create the store directory if it doesn't exist
                fs::create_dir_all(dir.as_path())?;
                fs::write(&path, json)?;
                log::info!("Saved configuration to {}", path.display());
            }
            Backend::Memory(entries) => {
                entries.insert(key.to_owned(), json);
                log::info!("Saved configuration '{}'", key);
            }
        }
        Ok(())
    }

    /// Load the raw document stored under `key`, `None` if there is none.
    ///
    /// The value is returned untyped so the caller can import it leniently.
    pub fn load(&self, key: &str) -> PersistenceResult<Option<serde_json::Value>> {
        let json = match &self.backend {
            Backend::Directory(dir) => {
                let path = Self::path_for(dir, key)?;
                if !path.exists() {
                    return Ok(None);
                }
                fs::read_to_string(&path)
                    .map_err(|e| PersistenceError::ReadError(format!("{}: {}", path.display(), e)))?
            }
            Backend::Memory(entries) => {
                Self::validate_key(key)?;
                match entries.get(key) {
                    Some(json) => json.clone(),
                    None => return Ok(None),
                }
            }
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Delete the document stored under `key`. Missing keys are fine.
    pub fn remove(&mut self, key: &str) -> PersistenceResult<()> {
        match &mut self.backend {
            Backend::Directory(dir) => {
                let path = Self::path_for(dir, key)?;
                if path.exists() {
                    fs::remove_file(path)?;
                }
            }
            Backend::Memory(entries) => {
                Self::validate_key(key)?;
                entries.remove(key);
            }
        }
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        match &self.backend {
            Backend::Directory(dir) => Self::path_for(dir, key).is_ok_and(|path| path.exists()),
            Backend::Memory(entries) => entries.contains_key(key),
        }
    }

    /// Start auto-saving every `interval_secs`, counting from `now`
    pub fn enable_autosave(&mut self, interval_secs: u64, now: u64) {
        self.autosave_interval = Some(interval_secs.max(1));
        self.last_autosave = now;
    }

    /// Stop auto-saving. Nothing is written until it is enabled again.
    pub fn disable_autosave(&mut self) {
        self.autosave_interval = None;
    }

    pub fn autosave_enabled(&self) -> bool {
        self.autosave_interval.is_some()
    }

    /// Check if we should auto-save based on the interval
    pub fn autosave_due(&self, now: u64) -> bool {
        match self.autosave_interval {
            Some(interval) => now.saturating_sub(self.last_autosave) >= interval,
            None => false,
        }
    }

    /// Perform auto-save if needed. Returns true when a document was written.
    pub fn try_autosave(&mut self, now: u64, document: &ConfigDocument) -> PersistenceResult<bool> {
        if !self.autosave_due(now) {
            return Ok(false);
        }

        // A failing store retries after the next interval, not every frame
        self.last_autosave = now;
        self.save(&format!("{}{}", AUTOSAVE_PREFIX, now), document)?;
        log::info!("Auto-saved configuration");

        self.cleanup_old_autosaves()?;
        Ok(true)
    }

    fn keys(&self) -> PersistenceResult<Vec<String>> {
        match &self.backend {
            Backend::Directory(dir) => {
                if !dir.exists() {
                    return Ok(Vec::new());
                }
                Ok(fs::read_dir(dir)?
                    .filter_map(|entry| entry.ok())
                    .filter_map(|entry| {
                        let name = entry.file_name().to_string_lossy().into_owned();
                        name.strip_suffix(".json").map(str::to_owned)
                    })
                    .collect())
            }
            Backend::Memory(entries) => Ok(entries.keys().cloned().collect()),
        }
    }

    /// Auto-save keys, oldest first
    fn autosave_keys(&self) -> PersistenceResult<Vec<(u64, String)>> {
        let mut keys: Vec<_> = self
            .keys()?
            .into_iter()
            .filter_map(|key| {
                let stamp = key.strip_prefix(AUTOSAVE_PREFIX)?.parse::<u64>().ok()?;
                Some((stamp, key))
            })
            .collect();

        keys.sort();
        Ok(keys)
    }

    /// Remove the oldest auto-saves beyond `max_autosaves`
    fn cleanup_old_autosaves(&mut self) -> PersistenceResult<()> {
        let keys = self.autosave_keys()?;
        let excess = keys.len().saturating_sub(self.max_autosaves);
        for (_, key) in keys.into_iter().take(excess) {
            self.remove(&key)?;
        }
        Ok(())
    }

    /// Find the key of the most recent auto-save
    pub fn latest_autosave(&self) -> PersistenceResult<Option<String>> {
        Ok(self.autosave_keys()?.pop().map(|(_, key)| key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::CubesatDimensions;
    use crate::registry::ComponentRegistry;

    fn scratch_store() -> ConfigStore {
        let dir = std::env::temp_dir().join(format!("cubesat-store-{}", uuid::Uuid::new_v4()));
        ConfigStore::new(dir)
    }

    fn empty_document() -> ConfigDocument {
        ConfigDocument::from_registry(&ComponentRegistry::default(), &CubesatDimensions::default())
    }

    #[test]
    fn keys_cannot_escape_the_directory() {
        let dir = Path::new("store");
        assert!(matches!(ConfigStore::path_for(dir, "../etc"), Err(PersistenceError::InvalidKey(_))));
        assert!(matches!(ConfigStore::path_for(dir, ""), Err(PersistenceError::InvalidKey(_))));
        assert!(ConfigStore::path_for(dir, "cubesat-config").is_ok());

        let mut memory = ConfigStore::in_memory(BTreeMap::new());
        assert!(matches!(memory.save("a/b", &empty_document()), Err(PersistenceError::InvalidKey(_))));
    }

    #[test]
    fn disabled_autosave_never_writes() {
        let mut store = scratch_store();
        assert!(!store.try_autosave(1_000, &empty_document()).unwrap());
        assert!(!store.dir().unwrap().exists());
    }

    #[test]
    fn autosave_keeps_newest() {
        let mut store = scratch_store().with_max_autosaves(2);
        store.enable_autosave(10, 0);
        let doc = empty_document();

        assert!(!store.try_autosave(5, &doc).unwrap());
        for now in [10, 20, 30] {
            assert!(store.try_autosave(now, &doc).unwrap());
        }

        assert_eq!(store.latest_autosave().unwrap().as_deref(), Some("autosave_30"));
        assert!(!store.contains("autosave_10"));
        assert!(store.contains("autosave_20"));

        store.disable_autosave();
        assert!(!store.autosave_due(1_000));
        fs::remove_dir_all(store.dir().unwrap()).unwrap();
    }

    #[test]
    fn memory_store_saves_loads_and_rotates() {
        let mut store = ConfigStore::in_memory(BTreeMap::new()).with_max_autosaves(1);
        let doc = empty_document();

        store.save("cubesat-config", &doc).unwrap();
        let loaded = store.load("cubesat-config").unwrap().unwrap();
        assert_eq!(loaded["version"], doc.version.as_str());
        assert_eq!(store.load("missing").unwrap(), None);

        store.enable_autosave(10, 0);
        assert!(store.try_autosave(10, &doc).unwrap());
        assert!(store.try_autosave(20, &doc).unwrap());
        assert_eq!(store.latest_autosave().unwrap().as_deref(), Some("autosave_20"));

        let keys: Vec<_> = store.entries().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["autosave_20", "cubesat-config"]);
        assert_eq!(store.dir(), None);

        store.remove("cubesat-config").unwrap();
        assert!(!store.contains("cubesat-config"));
    }
}
