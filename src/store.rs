//! Durable key-value storage for the selection set.
//!
//! The store maps string keys to string values. The selection is kept under
//! [`SELECTION_KEY`] as a JSON array of product ids. Absent or malformed
//! values read back as an empty selection.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::{from_reader, to_writer_pretty};

use crate::error::{Error, Result};
use crate::types::ProductId;

/// Key the selected product ids are stored under.
pub const SELECTION_KEY: &str = "loreal-selected-products";

/// Client-side key-value storage that survives across sessions.
pub trait PersistenceStore: Send {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// A store that only lives as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A store backed by a single JSON object file.
///
/// Every `set` rewrites the whole file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(err) => return Err(Error::io("failed to open store file", err)),
        };
        from_reader(BufReader::new(file)).map_err(|err| {
            if err.is_io() {
                Error::io("failed to read store file", err.into())
            } else {
                Error::serialization("failed to parse store file", Some(Box::new(err)))
            }
        })
    }
}

impl PersistenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // A corrupt file is replaced rather than blocking every future write.
        let mut values = match self.read_all() {
            Ok(values) => values,
            Err(err) if err.is_serialization() => {
                tracing::warn!(path = %self.path.display(), "replacing corrupt store file");
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        values.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|err| Error::io("failed to create store directory", err))?;
        }
        let file = File::create(&self.path)
            .map_err(|err| Error::io("failed to create store file", err))?;
        let mut writer = BufWriter::new(file);
        to_writer_pretty(&mut writer, &values).map_err(|err| {
            if err.is_io() {
                Error::io("failed to write store file", err.into())
            } else {
                Error::serialization("failed to serialize store file", Some(Box::new(err)))
            }
        })?;
        writer
            .flush()
            .map_err(|err| Error::io("failed to write store file", err))
    }
}

/// Reads the persisted selection.
///
/// Never fails: an unreadable, absent, or malformed value is an empty
/// selection.
pub fn load_selection(store: &dyn PersistenceStore) -> Vec<ProductId> {
    let saved = match store.get(SELECTION_KEY) {
        Ok(Some(saved)) => saved,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::warn!(error = %err, "could not read saved selections");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<ProductId>>(&saved) {
        Ok(ids) => ids,
        Err(err) => {
            tracing::warn!(error = %err, "could not parse saved selections");
            Vec::new()
        }
    }
}

/// Writes the selection to the store.
pub fn save_selection(store: &mut dyn PersistenceStore, ids: &[ProductId]) -> Result<()> {
    let encoded = serde_json::to_string(ids)?;
    store.set(SELECTION_KEY, &encoded)
}
