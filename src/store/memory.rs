use std::sync::RwLock;

use super::{Ordering, RecordStore, StoreError};
use crate::entry::Entry;

/// Transient backend: entries live only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn append(&self, entry: Entry) -> Result<(), StoreError> {
        self.entries
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .push(entry);
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Entry>, StoreError> {
        Ok(self.entries.read().map_err(|_| StoreError::Poisoned)?.clone())
    }

    fn ordering(&self) -> Ordering {
        Ordering::Insertion
    }
}
