//! Persistence port for achievement progress.
//!
//! The tracker only sees the `ProgressStore` trait; the binary plugs in
//! `JsonFileStore` (a single JSON file in the XDG state directory) while
//! tests use the in-memory `MemoryStore`. Missing or malformed data is never
//! an error: it simply loads as "no prior progress".

use crate::achievements::Progress;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Errors from writing progress to the backing store.
///
/// These are logged and swallowed by the tracker; no tracking operation
/// surfaces a failure to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    IoError(String),
    SerializeError(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::IoError(e) => write!(f, "storage I/O error: {}", e),
            StorageError::SerializeError(e) => write!(f, "storage serialize error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

/// Abstraction over where achievement progress lives.
pub trait ProgressStore {
    /// Load previously saved progress.
    ///
    /// Returns `None` when nothing was saved yet or the saved data does not
    /// parse; both cases mean "start from scratch".
    fn load(&self) -> Option<Progress>;

    /// Persist the full progress record, replacing whatever was there.
    fn save(&mut self, progress: &Progress) -> Result<(), StorageError>;
}

/// On-disk store: one pretty-printed JSON file in the XDG state directory.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at the default location:
    /// `$XDG_STATE_HOME/codefolio/achievements.json`
    /// (typically `~/.local/state/codefolio/achievements.json`).
    pub fn new() -> Self {
        Self {
            path: state_dir().join("achievements.json"),
        }
    }

    /// Store at an explicit path (used by tests and `--state-dir`).
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressStore for JsonFileStore {
    fn load(&self) -> Option<Progress> {
        if !self.path.exists() {
            return None;
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!("Failed to read {:?}: {}", self.path, e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(progress) => Some(progress),
            Err(e) => {
                // Treated as "no prior progress", not an error
                tracing::debug!("Malformed progress file {:?}: {}", self.path, e);
                None
            }
        }
    }

    fn save(&mut self, progress: &Progress) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(progress)
            .map_err(|e| StorageError::SerializeError(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::IoError(format!("{}: {}", parent.display(), e)))?;
        }

        fs::write(&self.path, contents)
            .map_err(|e| StorageError::IoError(format!("{}: {}", self.path.display(), e)))
    }
}

/// Get the state directory for codefolio, following the XDG spec.
///
/// Falls back to `~/.local/state/codefolio`, then to the system temp
/// directory when no home directory can be determined.
pub fn state_dir() -> PathBuf {
    if let Some(dir) = dirs::state_dir() {
        return dir.join("codefolio");
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".local").join("state").join("codefolio");
    }

    std::env::temp_dir().join("codefolio")
}

/// In-memory store for tests.
///
/// Round-trips through the real JSON serialization so tests exercise the
/// same format the file store writes. Cloned handles share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with raw (possibly invalid) JSON.
    pub fn with_raw(raw: &str) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(raw.to_string()))),
        }
    }

    /// The raw JSON currently held, if any.
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().unwrap().clone()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Option<Progress> {
        let slot = self.slot.lock().unwrap();
        let raw = slot.as_deref()?;
        match serde_json::from_str(raw) {
            Ok(progress) => Some(progress),
            Err(e) => {
                tracing::debug!("Malformed in-memory progress: {}", e);
                None
            }
        }
    }

    fn save(&mut self, progress: &Progress) -> Result<(), StorageError> {
        let contents = serde_json::to_string(progress)
            .map_err(|e| StorageError::SerializeError(e.to_string()))?;
        *self.slot.lock().unwrap() = Some(contents);
        Ok(())
    }
}
