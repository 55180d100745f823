//! Record store: where accepted entries live.
//!
//! Every backend satisfies the same append/list contract. A deployment picks
//! exactly one of them (see [`crate::config::Backend`]); nothing switches
//! backends inside a running process.

use serde::Serialize;
use thiserror::Error;

use crate::entry::Entry;

pub mod local;
pub mod memory;
pub mod table;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use table::TableStore;

/// Order in which a backend returns its entries from `list_all`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ordering {
    /// Oldest first, exactly as appended
    Insertion,
    /// Newest first, by server-assigned creation time
    NewestFirst,
}

/// Persistence failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage quota exceeded ({needed} bytes needed, {quota} allowed)")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("storage write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode entries: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Persistence contract shared by every backend
///
/// Implementations use interior locking so one instance can be shared behind
/// an `Arc` by every request handler.
pub trait RecordStore: Send + Sync {
    /// Durably add one entry
    ///
    /// On error nothing is added and previously stored entries are intact.
    fn append(&self, entry: Entry) -> Result<(), StoreError>;

    /// Every stored entry, in this backend's [`Ordering`]
    fn list_all(&self) -> Result<Vec<Entry>, StoreError>;

    fn ordering(&self) -> Ordering;

    /// Entry at a 1-based position of [`RecordStore::list_all`]
    ///
    /// # Arguments
    /// * `position` - 1-based position; 0 never matches
    ///
    /// # Returns
    /// * `Result<Option<Entry>, StoreError>` - The entry, None when out of range, or a store error
    fn get(&self, position: usize) -> Result<Option<Entry>, StoreError> {
        if position == 0 {
            return Ok(None);
        }
        Ok(self.list_all()?.into_iter().nth(position - 1))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::entry::{Entry, Gender};

    pub fn entry(name: &str, id_number: &str) -> Entry {
        Entry {
            full_name: name.to_string(),
            id_number: id_number.to_string(),
            phone: "01012345678".to_string(),
            gender: Gender::Male,
        }
    }
}
