use log::warn;
use std::collections::BTreeMap;
use std::fs::{self, create_dir_all};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

use super::{Ordering, RecordStore, StoreError};
use crate::entry::Entry;

/// Key under which the entry block is kept
pub const ENTRIES_KEY: &str = "registration-entries-v1";

/// Default quota, matching the usual browser local storage allowance
pub const DEFAULT_QUOTA: usize = 5 * 1024 * 1024;

/// Local persistent backend
///
/// Emulates browser local storage with a single JSON file mapping string keys
/// to string values. All entries are kept as one encoded block under
/// [`ENTRIES_KEY`]; an append rewrites the whole block.
///
/// A block that cannot be decoded is logged and read as "no entries". The
/// next append then starts a fresh list.
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    quota: Option<usize>,
    lock: Mutex<()>,
}

impl LocalStore {
    /// Open (and create if needed) the key-value file at `path`
    ///
    /// # Arguments
    /// * `path` - Location of the key-value file
    ///
    /// # Returns
    /// * `Result<LocalStore, StoreError>` - The store, or an IO error creating the file
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let dir = parent_dir(&path);
        if !dir.exists() {
            create_dir_all(dir)?;
        }
        if !path.exists() {
            fs::write(&path, b"{}")?;
        }

        Ok(LocalStore {
            path,
            quota: Some(DEFAULT_QUOTA),
            lock: Mutex::new(()),
        })
    }

    /// Replace the quota; `None` disables the check
    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one item from the key-value file
    pub fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(self.read_items()?.remove(key))
    }

    /// Write one item, leaving the other keys untouched
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut items = self.read_items()?;
        items.insert(key.to_string(), value.to_string());
        self.write_items(&items)
    }

    fn read_items(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!("Ignoring unreadable storage file {}: {}", self.path.display(), e);
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_items(&self, items: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let json = serde_json::to_string(items)?;

        if let Some(quota) = self.quota {
            if json.len() > quota {
                return Err(StoreError::QuotaExceeded {
                    needed: json.len(),
                    quota,
                });
            }
        }

        // Write next to the target and rename so a failed write never leaves a half-written file
        let mut file = NamedTempFile::new_in(parent_dir(&self.path))?;
        file.write_all(json.as_bytes())?;
        file.persist(&self.path).map_err(|e| e.error)?;

        Ok(())
    }
}

impl RecordStore for LocalStore {
    fn append(&self, entry: Entry) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;

        let mut items = self.read_items()?;
        let mut entries = decode_or_empty(items.get(ENTRIES_KEY).map(String::as_str));
        entries.push(entry);
        items.insert(ENTRIES_KEY.to_string(), encode_block(&entries)?);

        self.write_items(&items)
    }

    fn list_all(&self) -> Result<Vec<Entry>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;

        match self.read_items() {
            Ok(items) => Ok(decode_or_empty(items.get(ENTRIES_KEY).map(String::as_str))),
            Err(e) => {
                warn!("Reading {} failed, showing no entries: {}", self.path.display(), e);
                Ok(Vec::new())
            }
        }
    }

    fn ordering(&self) -> Ordering {
        Ordering::Insertion
    }
}

/// Encode entries as the stored JSON array block
pub fn encode_block(entries: &[Entry]) -> Result<String, serde_json::Error> {
    serde_json::to_string(entries)
}

/// Decode a stored JSON array block
pub fn decode_block(block: &str) -> Result<Vec<Entry>, serde_json::Error> {
    serde_json::from_str(block)
}

fn decode_or_empty(block: Option<&str>) -> Vec<Entry> {
    match block {
        None => Vec::new(),
        Some(block) => decode_block(block).unwrap_or_else(|e| {
            warn!("Stored entries could not be decoded, treating as empty: {}", e);
            Vec::new()
        }),
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
