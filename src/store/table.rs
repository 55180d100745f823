use log::{error, warn};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

use super::{Ordering, RecordStore, StoreError};
use crate::entry::{Entry, Gender};

/// Table-backed database backend
///
/// Entries are rows of the `registrations` table. `created_at` is assigned by
/// the database on insert and `list_all` returns newest first.
pub struct TableStore {
    conn: Mutex<Connection>,
}

impl TableStore {
    /// Open the database file at `path` and make sure the table exists
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        // WAL for crash recovery
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        setup_table(&conn)?;
        Ok(TableStore {
            conn: Mutex::new(conn),
        })
    }

    fn query_all(&self) -> Result<Vec<Entry>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut stmt = conn.prepare(
            "SELECT full_name, id_number, phone, gender FROM registrations
             ORDER BY created_at DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (full_name, id_number, phone, gender) = row?;
            match Gender::parse(&gender) {
                Some(gender) => entries.push(Entry {
                    full_name,
                    id_number,
                    phone,
                    gender,
                }),
                None => warn!("Skipping registration row with unknown gender {:?}", gender),
            }
        }

        Ok(entries)
    }
}

pub fn setup_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS registrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            full_name TEXT NOT NULL,
            id_number TEXT NOT NULL,
            phone TEXT NOT NULL,
            gender TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_registrations_created_at ON registrations(created_at)",
        [],
    )?;

    Ok(())
}

impl RecordStore for TableStore {
    fn append(&self, entry: Entry) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT INTO registrations (full_name, id_number, phone, gender) VALUES (?1, ?2, ?3, ?4)",
            params![entry.full_name, entry.id_number, entry.phone, entry.gender.label()],
        )?;
        Ok(())
    }

    /// Read failures are logged and reported as an empty list
    fn list_all(&self) -> Result<Vec<Entry>, StoreError> {
        match self.query_all() {
            Ok(entries) => Ok(entries),
            Err(e) => {
                error!("Listing registrations failed: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn ordering(&self) -> Ordering {
        Ordering::NewestFirst
    }
}
