mod config;
mod memory;
pub mod sqlite;

pub use config::{BehaviorConfig, Config, DisplayConfig, NotificationsConfig, TimerConfig};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Environment variable that overrides the data directory entirely.
pub const DATA_DIR_ENV: &str = "POMOTIDE_DATA_DIR";

/// Returns the data directory, creating it if needed.
///
/// `$POMOTIDE_DATA_DIR` wins when set. Otherwise `~/.config/pomotide/`, or
/// `~/.config/pomotide-dev/` when `POMOTIDE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os(DATA_DIR_ENV) {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOTIDE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomotide-dev")
            } else {
                base_dir.join("pomotide")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(StorageError::DataDir)?;
    Ok(dir)
}

/// Opaque durable key-value store.
///
/// The persistence gateway is the only writer; no locking or versioning is
/// layered on top, the last write wins.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key)
    }
}
