//! Installation records held in memory.
//!
//! A snapshot is a JSON document mirroring the two registry hives the
//! inventory reads:
//!
//! ```json
//! {
//!   "HKEY_LOCAL_MACHINE": {
//!     "keys": {
//!       "Software": { "keys": { "...": {} } }
//!     }
//!   },
//!   "HKEY_USERS": {
//!     "keys": {
//!       "S-1-5-21-1000": { "keys": {} }
//!     }
//!   }
//! }
//! ```
//!
//! Each node has optional `keys` (children) and `values` (name to string or
//! integer). Key names are matched case-insensitively, as the registry does.

use crate::error::RecordError;
use crate::sources::{RecordKey, RecordStore, RecordValue, Root};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotNode {
    #[serde(default)]
    pub keys: BTreeMap<String, SnapshotNode>,
    #[serde(default)]
    pub values: BTreeMap<String, RecordValue>,
}

impl SnapshotNode {
    fn child(&self, name: &str) -> Option<&SnapshotNode> {
        self.keys
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, node)| node)
    }
}

// Builders for assembling records in code.
#[cfg(test)]
impl SnapshotNode {
    /// Returns the descendant at `path`, creating missing keys.
    pub fn key(&mut self, path: &str) -> &mut SnapshotNode {
        let mut node = self;
        for segment in path.split('\\').filter(|s| !s.is_empty()) {
            let existing = node
                .keys
                .keys()
                .find(|k| k.eq_ignore_ascii_case(segment))
                .cloned()
                .unwrap_or_else(|| segment.to_string());
            node = node.keys.entry(existing).or_default();
        }
        node
    }

    pub fn value(&mut self, name: &str, value: RecordValue) -> &mut SnapshotNode {
        self.values.insert(name.to_string(), value);
        self
    }

    pub fn text(&mut self, name: &str, value: &str) -> &mut SnapshotNode {
        self.value(name, RecordValue::Text(value.to_string()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotStore {
    #[serde(rename = "HKEY_LOCAL_MACHINE", default)]
    machine: SnapshotNode,
    #[serde(rename = "HKEY_USERS", default)]
    users: SnapshotNode,
}

impl SnapshotStore {
    #[cfg(test)]
    pub fn new(machine: SnapshotNode, users: SnapshotNode) -> Self {
        Self { machine, users }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Invalid record snapshot")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        Self::from_json(&content)
    }
}

pub struct SnapshotKey<'s> {
    node: &'s SnapshotNode,
    path: String,
}

impl RecordKey for SnapshotKey<'_> {
    fn open(&self, path: &str) -> Result<Self, RecordError> {
        let mut node = self.node;
        for segment in path.split('\\').filter(|s| !s.is_empty()) {
            node = node
                .child(segment)
                .ok_or_else(|| RecordError::NotFound(format!("{}\\{}", self.path, path)))?;
        }
        Ok(SnapshotKey {
            node,
            path: format!("{}\\{}", self.path, path),
        })
    }

    fn subkey_names(&self) -> Result<Vec<String>, RecordError> {
        Ok(self.node.keys.keys().cloned().collect())
    }

    fn value(&self, name: &str) -> Result<Option<RecordValue>, RecordError> {
        Ok(self
            .node
            .values
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone()))
    }
}

impl RecordStore for SnapshotStore {
    type Key<'s> = SnapshotKey<'s>;

    fn open_root(&self, root: Root) -> Result<SnapshotKey<'_>, RecordError> {
        let (node, path) = match root {
            Root::LocalMachine => (&self.machine, "HKEY_LOCAL_MACHINE"),
            Root::Users => (&self.users, "HKEY_USERS"),
        };
        Ok(SnapshotKey {
            node,
            path: path.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_snapshot() {
        let store = SnapshotStore::from_json(
            r#"{
                "HKEY_LOCAL_MACHINE": {
                    "keys": {
                        "SOFTWARE": {
                            "keys": {
                                "Vim": { "values": { "DisplayName": "Vim 9.1", "SystemComponent": 0 } }
                            }
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        let root = store.open_root(Root::LocalMachine).unwrap();
        let key = root.open(r"Software\vim").unwrap();
        assert_eq!(
            key.value("displayname").unwrap(),
            Some(RecordValue::Text("Vim 9.1".into()))
        );
        assert_eq!(key.value("SystemComponent").unwrap(), Some(RecordValue::Int(0)));
        assert!(store.open_root(Root::Users).unwrap().subkey_names().unwrap().is_empty());
    }

    #[test]
    fn missing_key_is_not_found() {
        let store = SnapshotStore::default();
        let root = store.open_root(Root::LocalMachine).unwrap();
        match root.open(r"Software\Nope") {
            Err(RecordError::NotFound(path)) => assert!(path.ends_with(r"Software\Nope")),
            _ => panic!("expected NotFound"),
        }
    }

    #[test]
    fn builder_reuses_keys_case_insensitively() {
        let mut node = SnapshotNode::default();
        node.key(r"Software\Microsoft").text("A", "1");
        node.key(r"SOFTWARE\microsoft").text("B", "2");
        assert_eq!(node.keys.len(), 1);
        assert_eq!(node.key(r"Software\Microsoft").values.len(), 2);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(SnapshotStore::from_json("{ not json").is_err());
    }
}
