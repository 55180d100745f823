/*!
# Registration Form

A small data-collection service with an Arabic, right-to-left web form.
Visitors submit a registration record (full name, national ID, phone,
gender); operators view the collected records behind a shared password and
export them to a spreadsheet.

## Architecture

### Core
- **Validator** - Checks a submitted record field by field and returns either
  an accepted [`Entry`] or the first rule it broke
- **Record Store** - Append/list persistence with three interchangeable
  backends, one picked per deployment:
  - `MemoryStore` - process memory, insertion order, lost on restart
  - `LocalStore` - one JSON block under a fixed key in a key-value file,
    insertion order
  - `TableStore` - rows of a `registrations` table (SQLite), newest first
- **Export** - XLSX and CSV downloads with a fixed, localized header row
- **Access gate** - Shared-secret check setting a per-session authorization
  flag

### Web Layer (feature `web`)
- **Technologies**: Rust, axum
- Static RTL pages for the form, the password prompt and the data table
- JSON endpoints returning a [`app::Notice`] for every outcome; the pages
  decide how to display it

### Data Persistence
- Local backend: key `registration-entries-v1` holding a JSON array of
  `{fullName, idNumber, phone, gender}`
- Table backend: `registrations(id, full_name, id_number, phone, gender, created_at)`
- Backups: gzip-compressed bincode archives (`.bin.gz`), restored only when
  every archived entry validates again

## Modules

- **entry**: Entry, EntryForm and Gender
- **validator**: Field rules and localized rejection reasons
- **store**: RecordStore trait and its backends
- **downloader**: Export functionality (XLSX, CSV)
- **saving**: Backup archives with compression
- **login**: Access gate and session table
- **config**: Environment configuration
- **labels**: Localized strings
- **app**: Routing and middleware

## REST API Endpoints

- `POST /api/entries` - Submit a record (urlencoded form or JSON)
- `POST /api/login`, `POST /api/logout` - Open or close an authorized session
- `GET /api/entries` - List records (authorized)
- `GET /api/entries/{position}` - One record, 1-based (authorized)
- `GET /api/export/xlsx`, `GET /api/export/csv` - Downloads (authorized)
*/

pub mod config;
pub mod downloader;
pub mod entry;
pub mod labels;
pub mod login;
pub mod saving;
pub mod store;
pub mod validator;

#[cfg(feature = "web")]
pub mod app;

/// Re-export the commonly used items
pub use config::{Backend, Config, ConfigError};
pub use downloader::{ExportError, ExportRow, export_rows, export_spreadsheet, to_csv, to_xlsx};
pub use entry::{Entry, EntryForm, Gender};
pub use login::{AccessGate, AuthError, SessionStore};
pub use saving::{ArchiveError, backup_store, load_archive, restore_store, save_archive};
pub use store::{LocalStore, MemoryStore, Ordering, RecordStore, StoreError, TableStore};
pub use validator::{ValidationError, validate};
