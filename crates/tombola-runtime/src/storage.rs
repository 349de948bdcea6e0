#![forbid(unsafe_code)]

//! Key-value persistence.
//!
//! A [`Storage`] front-end over pluggable [`StorageBackend`]s. Backends
//! move whole entry maps and report errors; the front-end caches entries
//! in memory, writes through on every set, and exposes the degrade
//! contract the rest of the application relies on: reads that fail
//! surface as "no data", writes report `bool` success, and nothing here
//! panics or propagates a storage error to a caller.
//!
//! [`MemoryStore`] is always available; [`FileStore`] (a versioned JSON
//! file with atomic write-rename) requires the `persistence` feature.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use serde::Serialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by storage backends.
#[derive(Debug)]
pub enum StorageError {
    /// I/O failure during file operations.
    Io(std::io::Error),
    /// JSON encode/decode failure.
    Serialization(String),
    /// Stored data is present but unusable.
    Corruption(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// A pluggable storage backend holding JSON values by key.
///
/// Implementations must be thread-safe. `save_all` replaces all stored
/// entries (not a merge) and should be atomic; `load_all` should survive
/// partial corruption rather than failing entirely.
pub trait StorageBackend: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Load every stored entry. Empty map on first run.
    fn load_all(&self) -> StorageResult<HashMap<String, Value>>;

    /// Replace all stored entries atomically.
    fn save_all(&self, entries: &HashMap<String, Value>) -> StorageResult<()>;

    /// Remove all stored entries.
    fn clear(&self) -> StorageResult<()>;

    /// Whether the backend can currently persist.
    fn is_available(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Memory backend (always available)
// ---------------------------------------------------------------------------

/// In-memory backend for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStore {
    fn name(&self) -> &str {
        "MemoryStore"
    }

    fn load_all(&self) -> StorageResult<HashMap<String, Value>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save_all(&self, entries: &HashMap<String, Value>) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        *guard = entries.clone();
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.clear();
        Ok(())
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.data.read().map(|g| g.len()).unwrap_or(0);
        f.debug_struct("MemoryStore").field("entries", &count).finish()
    }
}

// ---------------------------------------------------------------------------
// File backend (requires the persistence feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "persistence")]
mod file_store {
    use super::*;
    use serde::Deserialize;
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// On-disk format: one JSON document holding every key.
    #[derive(Serialize, Deserialize)]
    struct StoreFile {
        /// Format version for future migrations.
        format_version: u32,
        entries: HashMap<String, Value>,
    }

    impl StoreFile {
        const FORMAT_VERSION: u32 = 1;

        fn new() -> Self {
            Self {
                format_version: Self::FORMAT_VERSION,
                entries: HashMap::new(),
            }
        }
    }

    /// JSON file backend with atomic writes.
    ///
    /// Writes go to `{path}.tmp`, are flushed and synced, then renamed
    /// over `{path}` so a crash never leaves a half-written store.
    pub struct FileStore {
        path: PathBuf,
    }

    impl FileStore {
        /// Create a file store at the given path. The file is created on
        /// first save.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        /// Store at the platform state directory:
        /// `$XDG_STATE_HOME/tombola/store.json`, falling back to
        /// `~/.local/state` and finally the working directory.
        #[must_use]
        pub fn default_location() -> Self {
            let base = if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
                PathBuf::from(state_home)
            } else if let Ok(home) = std::env::var("HOME") {
                PathBuf::from(home).join(".local").join("state")
            } else {
                PathBuf::from(".")
            };
            Self {
                path: base.join("tombola").join("store.json"),
            }
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }
    }

    impl StorageBackend for FileStore {
        fn name(&self) -> &str {
            "FileStore"
        }

        fn load_all(&self) -> StorageResult<HashMap<String, Value>> {
            if !self.path.exists() {
                // First run.
                return Ok(HashMap::new());
            }

            let file = File::open(&self.path)?;
            let reader = BufReader::new(file);
            let store: StoreFile = serde_json::from_reader(reader).map_err(|e| {
                StorageError::Serialization(format!("failed to parse store file: {e}"))
            })?;

            if store.format_version != StoreFile::FORMAT_VERSION {
                tracing::warn!(
                    stored = store.format_version,
                    expected = StoreFile::FORMAT_VERSION,
                    "store file format version mismatch, ignoring stored data"
                );
                return Ok(HashMap::new());
            }

            Ok(store.entries)
        }

        fn save_all(&self, entries: &HashMap<String, Value>) -> StorageResult<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }

            let mut store = StoreFile::new();
            store.entries = entries.clone();

            let tmp_path = self.temp_path();
            {
                let file = File::create(&tmp_path)?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, &store).map_err(|e| {
                    StorageError::Serialization(format!("failed to serialize store: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }
            fs::rename(&tmp_path, &self.path)?;

            tracing::debug!(
                path = %self.path.display(),
                entries = entries.len(),
                "saved store"
            );
            Ok(())
        }

        fn clear(&self) -> StorageResult<()> {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            Ok(())
        }

        fn is_available(&self) -> bool {
            match self.path.parent() {
                Some(parent) if parent.exists() => {
                    let probe = parent.join(".tombola_write_probe");
                    if fs::write(&probe, b"probe").is_ok() {
                        let _ = fs::remove_file(&probe);
                        true
                    } else {
                        false
                    }
                }
                Some(parent) => fs::create_dir_all(parent).is_ok(),
                None => false,
            }
        }
    }

    impl fmt::Debug for FileStore {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStore").field("path", &self.path).finish()
        }
    }
}

#[cfg(feature = "persistence")]
pub use file_store::FileStore;

// ---------------------------------------------------------------------------
// Storage front-end
// ---------------------------------------------------------------------------

/// The key-value collaborator handed to the rest of the application.
///
/// Holds an in-memory cache of the backend's entries. Reads come from
/// the cache; every set writes the full map through to the backend and
/// reports success. Backend failures are logged and degraded, never
/// propagated.
pub struct Storage {
    backend: Box<dyn StorageBackend>,
    cache: RwLock<HashMap<String, Value>>,
}

impl Storage {
    /// Wrap a backend and load its current contents. A failed load logs
    /// and starts empty.
    #[must_use]
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        let cache = match backend.load_all() {
            Ok(entries) => {
                tracing::debug!(backend = %backend.name(), count = entries.len(), "loaded store");
                entries
            }
            Err(e) => {
                tracing::warn!(backend = %backend.name(), error = %e, "store load failed, starting empty");
                HashMap::new()
            }
        };
        Self {
            backend,
            cache: RwLock::new(cache),
        }
    }

    /// Ephemeral storage for tests and `--no-save` sessions.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Read a JSON value. `None` when absent or unreadable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.cache.read().ok()?.get(key).cloned()
    }

    /// Read a JSON value, falling back to `default`.
    #[must_use]
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }

    /// Read a plain string value. `None` when absent or not a string.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Store a serializable value. Returns whether it was persisted.
    pub fn set(&self, key: &str, value: &impl Serialize) -> bool {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key, error = %e, "value serialization failed");
                return false;
            }
        };
        self.set_value(key, value)
    }

    /// Store a plain string value. Returns whether it was persisted.
    pub fn set_string(&self, key: &str, value: &str) -> bool {
        self.set_value(key, Value::String(value.to_string()))
    }

    /// Remove a key. Returns whether the change was persisted.
    pub fn remove(&self, key: &str) -> bool {
        let Ok(mut cache) = self.cache.write() else {
            return false;
        };
        cache.remove(key);
        let snapshot = cache.clone();
        drop(cache);
        self.write_through(&snapshot)
    }

    /// Backend name for logging.
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Whether the backend can currently persist.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    fn set_value(&self, key: &str, value: Value) -> bool {
        let Ok(mut cache) = self.cache.write() else {
            return false;
        };
        cache.insert(key.to_string(), value);
        let snapshot = cache.clone();
        drop(cache);
        self.write_through(&snapshot)
    }

    fn write_through(&self, entries: &HashMap<String, Value>) -> bool {
        match self.backend.save_all(entries) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(backend = %self.backend.name(), error = %e, "store write failed");
                false
            }
        }
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.cache.read().map(|c| c.len()).unwrap_or(0);
        f.debug_struct("Storage")
            .field("backend", &self.backend.name())
            .field("entries", &count)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
