use crate::error::RecordError;
use crate::model::InstalledEntity;
use anyhow::Result;
use serde::Deserialize;

pub mod installer;
#[cfg(windows)]
pub mod registry;
pub mod snapshot;
pub mod uninstall;

pub trait Source {
    fn scan(&self) -> Result<Vec<InstalledEntity>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    LocalMachine,
    Users,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Int(i64),
    Text(String),
}

/// One open key of a hierarchical installation-record store.
pub trait RecordKey: Sized {
    /// Opens a descendant by backslash-separated path.
    fn open(&self, path: &str) -> Result<Self, RecordError>;
    fn subkey_names(&self) -> Result<Vec<String>, RecordError>;
    /// `Ok(None)` when the value does not exist.
    fn value(&self, name: &str) -> Result<Option<RecordValue>, RecordError>;
    fn close(self) -> Result<(), RecordError> {
        Ok(())
    }
}

pub trait RecordStore {
    type Key<'s>: RecordKey
    where
        Self: 's;

    fn open_root(&self, root: Root) -> Result<Self::Key<'_>, RecordError>;
}

/// String value, `""` when absent.
pub fn text_value<K: RecordKey>(key: &K, name: &str) -> Result<String, RecordError> {
    Ok(match key.value(name)? {
        Some(RecordValue::Text(s)) => s,
        Some(RecordValue::Int(n)) => n.to_string(),
        None => String::new(),
    })
}

/// True iff the value is the integer 1. Absent means false.
pub fn flag_value<K: RecordKey>(key: &K, name: &str) -> Result<bool, RecordError> {
    match key.value(name)? {
        Some(RecordValue::Int(n)) => Ok(n == 1),
        Some(RecordValue::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(|n| n == 1)
            .map_err(|_| RecordError::Conversion {
                name: name.to_string(),
                value: s,
            }),
        None => Ok(false),
    }
}

/// Releases a key, logging rather than propagating failures.
pub fn close_quietly<K: RecordKey>(key: K, what: &str) {
    if let Err(e) = key.close() {
        log::warn!("Error closing {}: {}", what, e);
    }
}
