//! Local key/value store adapter.
//!
//! # Responsibility
//! - Read and write whole JSON documents under logical keys.
//! - Turn missing, unreadable or corrupted documents into "absent".
//!
//! # Invariants
//! - `load` never returns an error; callers supply the fallback.
//! - `save` replaces the whole value and is durable when it returns `Ok`.
//! - Last write wins; there is no partial update.

use crate::db::DbError;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

/// Logical document keys shared by every manager.
pub mod keys {
    pub const HABITS: &str = "habits";
    pub const TASKS: &str = "tasks";
    pub const CATEGORIES: &str = "categories";
    pub const CATEGORY_COLORS: &str = "categoryColors";
    pub const TAGS: &str = "tags";
    pub const PROJECTS: &str = "projects";
    pub const USERS: &str = "users";
    pub const CURRENT_USER: &str = "currentUser";
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Write-side failure of the store. Reads never surface errors.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Serialize {
        key: String,
        source: serde_json::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialize { key, source } => {
                write!(f, "failed to serialize document `{key}`: {source}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize { source, .. } => Some(source),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract behind every manager.
///
/// Implementors provide the raw string operations; typed access comes from
/// the provided `load`/`save` helpers.
pub trait KvStore {
    fn get_raw(&self, key: &str) -> StoreResult<Option<String>>;
    fn set_raw(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// Loads and parses the document under `key`.
    ///
    /// Returns `None` when the key is missing, the backend read fails, or the
    /// stored JSON does not parse as `T`. Failures are logged, never returned.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.get_raw(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(
                    "event=store_load module=store status=error key={} error_code=store_read_failed error={}",
                    key, err
                );
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                // serde messages can echo stored text, so only location is logged.
                warn!(
                    "event=store_load module=store status=error key={} error_code=store_parse_failed category={:?} line={} column={}",
                    key,
                    err.classify(),
                    err.line(),
                    err.column()
                );
                None
            }
        }
    }

    /// `load` with a caller-supplied fallback.
    fn load_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.load(key).unwrap_or(default)
    }

    /// Serializes `value` and replaces the document under `key`.
    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.set_raw(key, &raw)
    }
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get_raw(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_raw(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        (**self).keys()
    }
}
