use log::{info, warn};
use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr, sync::Arc};
use thiserror::Error;

use crate::store::{LocalStore, MemoryStore, RecordStore, StoreError, TableStore};

/// Which record store a deployment uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Local,
    Table,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(Backend::Memory),
            "local" => Ok(Backend::Local),
            "table" => Ok(Backend::Table),
            other => Err(format!("unknown backend {other:?}, expected memory, local or table")),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

pub struct Config {
    pub addr: SocketAddr,
    pub backend: Backend,
    pub data_path: PathBuf,
    pub secret: String,
    pub session_hours: u32,
    pub quota_bytes: usize,
}

impl Config {
    /// Read the configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`, falling back to defaults for unset keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend: Backend = try_load(&lookup, "REGISTRATION_BACKEND", "local")?;
        let default_path = match backend {
            Backend::Table => "database/registrations.db",
            _ => "database/registrations.json",
        };

        let secret = lookup("REGISTRATION_SECRET").unwrap_or_else(|| {
            warn!("REGISTRATION_SECRET not set, using the built-in default");
            "0504".to_string()
        });
        if secret.is_empty() {
            return Err(ConfigError::Empty("REGISTRATION_SECRET"));
        }

        Ok(Self {
            addr: try_load(&lookup, "REGISTRATION_ADDR", "127.0.0.1:3000")?,
            backend,
            data_path: try_load(&lookup, "REGISTRATION_DATA", default_path)?,
            secret,
            session_hours: try_load(&lookup, "REGISTRATION_SESSION_HOURS", "24")?,
            quota_bytes: try_load(&lookup, "REGISTRATION_QUOTA_BYTES", "5242880")?,
        })
    }

    /// Build the configured record store
    pub fn open_store(&self) -> Result<Arc<dyn RecordStore>, StoreError> {
        let store: Arc<dyn RecordStore> = match self.backend {
            Backend::Memory => Arc::new(MemoryStore::new()),
            Backend::Local => Arc::new(
                LocalStore::open(&self.data_path)?.with_quota(Some(self.quota_bytes)),
            ),
            Backend::Table => Arc::new(TableStore::open(&self.data_path)?),
        };

        info!("Using {:?} backend ({:?} order)", self.backend, store.ordering());
        Ok(store)
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();

        assert_eq!(config.addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.backend, Backend::Local);
        assert_eq!(config.data_path, PathBuf::from("database/registrations.json"));
        assert_eq!(config.secret, "0504");
        assert_eq!(config.session_hours, 24);
        assert_eq!(config.quota_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_table_backend_defaults_to_db_file() {
        let config = Config::from_lookup(lookup_from(&[("REGISTRATION_BACKEND", "table")])).unwrap();
        assert_eq!(config.backend, Backend::Table);
        assert_eq!(config.data_path, PathBuf::from("database/registrations.db"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("REGISTRATION_BACKEND", "memory"),
            ("REGISTRATION_ADDR", "0.0.0.0:8080"),
            ("REGISTRATION_SECRET", "admin123"),
            ("REGISTRATION_SESSION_HOURS", "1"),
        ]))
        .unwrap();

        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.secret, "admin123");
        assert_eq!(config.session_hours, 1);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = Config::from_lookup(lookup_from(&[("REGISTRATION_BACKEND", "postgres")]))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::Invalid { key: "REGISTRATION_BACKEND", .. }));

        let err = Config::from_lookup(lookup_from(&[("REGISTRATION_SESSION_HOURS", "soon")]))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::Invalid { key: "REGISTRATION_SESSION_HOURS", .. }));
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("REGISTRATION_SECRET", "")]))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::Empty("REGISTRATION_SECRET")));
    }

    #[test]
    fn test_memory_store_opens() {
        let config = Config::from_lookup(lookup_from(&[("REGISTRATION_BACKEND", "memory")])).unwrap();
        let store = config.open_store().unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }
}
