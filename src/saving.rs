use bincode::{deserialize_from, serialize_into};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::{info, warn};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use crate::entry::{Entry, EntryForm};
use crate::store::{Ordering, RecordStore, StoreError};
use crate::validator::{ValidationError, validate};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// 1-based position of the first archived entry that fails validation
    #[error("archived entry {position} is invalid: {reason}")]
    Invalid {
        position: usize,
        reason: ValidationError,
    },
}

/// Back up entries to a gzip-compressed bincode archive
///
/// # Arguments
/// * `entries` - Entries to archive, in the order they should be restored
/// * `filename` - Destination path, conventionally ending in `.bin.gz`
pub fn save_archive(entries: &[Entry], filename: &Path) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut writer = std::io::BufWriter::new(encoder);

    serialize_into(&mut writer, entries)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    // Surface write errors here instead of losing them on drop
    let encoder = writer.into_inner().map_err(|e| e.into_error())?;
    encoder.finish()?.flush()?;

    Ok(())
}

/// Load entries from an archive written by [`save_archive`]
pub fn load_archive(filename: &Path) -> std::io::Result<Vec<Entry>> {
    let file = File::open(filename)?;
    let decoder = GzDecoder::new(file);
    let mut reader = std::io::BufReader::new(decoder);

    let entries: Vec<Entry> = deserialize_from(&mut reader)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    Ok(entries)
}

/// Archive every entry of `store`, oldest first
///
/// Newest-first listings are reversed so that [`restore_store`] re-appends
/// the entries in the order they were originally stored.
///
/// # Returns
/// * `Result<usize, ArchiveError>` - Number of archived entries
pub fn backup_store(store: &dyn RecordStore, filename: &Path) -> Result<usize, ArchiveError> {
    let mut entries = store.list_all()?;
    if store.ordering() == Ordering::NewestFirst {
        entries.reverse();
    }

    save_archive(&entries, filename)?;
    Ok(entries.len())
}

/// Append the entries of an archive to `store`
///
/// Every archived entry is validated again before anything is written. One
/// invalid entry rejects the whole archive and leaves the store untouched.
///
/// # Returns
/// * `Result<usize, ArchiveError>` - Number of restored entries
pub fn restore_store(store: &dyn RecordStore, filename: &Path) -> Result<usize, ArchiveError> {
    let archived = load_archive(filename)?;

    let mut entries = Vec::with_capacity(archived.len());
    for (i, entry) in archived.iter().enumerate() {
        let checked = validate(&EntryForm::from(entry)).map_err(|reason| {
            warn!("Rejected archive {}: entry {} {}", filename.display(), i + 1, reason.code());
            ArchiveError::Invalid {
                position: i + 1,
                reason,
            }
        })?;
        entries.push(checked);
    }

    let count = entries.len();
    for entry in entries {
        store.append(entry)?;
    }

    info!("Restored {} entries from {}", count, filename.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Gender;
    use crate::store::testing::entry;
    use crate::store::{MemoryStore, TableStore};
    use tempfile::TempDir;

    #[test]
    fn test_archive_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup.bin.gz");
        let entries = vec![
            Entry {
                full_name: "Ahmed Ali".to_string(),
                id_number: "12345678901234".to_string(),
                phone: "01012345678".to_string(),
                gender: Gender::Male,
            },
            Entry {
                full_name: "منى".to_string(),
                id_number: "00000000000000".to_string(),
                phone: "01100000000".to_string(),
                gender: Gender::Female,
            },
        ];

        save_archive(&entries, &path).unwrap();
        assert_eq!(load_archive(&path).unwrap(), entries);
    }

    #[test]
    fn test_garbage_archive_is_invalid_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.bin.gz");
        std::fs::write(&path, b"not an archive").unwrap();

        assert!(load_archive(&path).is_err());
    }

    #[test]
    fn test_restore_rejects_invalid_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tampered.bin.gz");
        let tampered = Entry {
            full_name: "   ".to_string(),
            id_number: "123".to_string(),
            phone: "x".to_string(),
            gender: Gender::Male,
        };
        save_archive(&[tampered], &path).unwrap();

        let store = MemoryStore::new();
        let err = restore_store(&store, &path).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::Invalid {
                position: 1,
                reason: ValidationError::FullNameRequired
            }
        ));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_restore_is_all_or_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mixed.bin.gz");
        let mut short_phone = entry("Mona", "00000000000000");
        short_phone.phone = "0101".to_string();
        save_archive(
            &[entry("Ahmed", "12345678901234"), short_phone, entry("Omar", "11111111111111")],
            &path,
        )
        .unwrap();

        let store = MemoryStore::new();
        store.append(entry("Existing", "22222222222222")).unwrap();

        let err = restore_store(&store, &path).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::Invalid {
                position: 2,
                reason: ValidationError::PhoneLength
            }
        ));

        let names: Vec<_> = store.list_all().unwrap().into_iter().map(|e| e.full_name).collect();
        assert_eq!(names, vec!["Existing"]);
    }

    #[test]
    fn test_restore_appends_valid_archive_after_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup.bin.gz");
        save_archive(&[entry("Ahmed", "12345678901234"), entry("Mona", "00000000000000")], &path)
            .unwrap();

        let store = MemoryStore::new();
        store.append(entry("Existing", "22222222222222")).unwrap();
        assert_eq!(restore_store(&store, &path).unwrap(), 2);

        let names: Vec<_> = store.list_all().unwrap().into_iter().map(|e| e.full_name).collect();
        assert_eq!(names, vec!["Existing", "Ahmed", "Mona"]);
    }

    #[test]
    fn test_missing_archive_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();

        let err = restore_store(&store, &dir.path().join("absent.bin.gz")).unwrap_err();
        assert!(matches!(err, ArchiveError::Io(_)));
    }

    #[test]
    fn test_table_backup_restores_in_same_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.bin.gz");

        let source = TableStore::open_in_memory().unwrap();
        for (name, id_number) in [
            ("Ahmed", "12345678901234"),
            ("Mona", "00000000000000"),
            ("Omar", "11111111111111"),
        ] {
            source.append(entry(name, id_number)).unwrap();
        }
        assert_eq!(backup_store(&source, &path).unwrap(), 3);

        // Archived oldest first
        let archived: Vec<_> = load_archive(&path).unwrap().into_iter().map(|e| e.full_name).collect();
        assert_eq!(archived, vec!["Ahmed", "Mona", "Omar"]);

        let restored = TableStore::open_in_memory().unwrap();
        assert_eq!(restore_store(&restored, &path).unwrap(), 3);
        assert_eq!(restored.list_all().unwrap(), source.list_all().unwrap());
    }

    #[test]
    fn test_memory_backup_keeps_insertion_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.bin.gz");

        let source = MemoryStore::new();
        source.append(entry("Ahmed", "12345678901234")).unwrap();
        source.append(entry("Mona", "00000000000000")).unwrap();
        backup_store(&source, &path).unwrap();

        let restored = MemoryStore::new();
        restore_store(&restored, &path).unwrap();
        assert_eq!(restored.list_all().unwrap(), source.list_all().unwrap());
    }
}
