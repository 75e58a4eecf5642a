use crate::error::RecordError;
use crate::sources::{RecordKey, RecordStore, RecordValue, Root};
use std::io;
use winreg::enums::*;
use winreg::types::FromRegValue;
use winreg::RegKey;

/// The live Windows registry.
pub struct WindowsRegistry;

pub struct RegistryKey {
    key: RegKey,
    path: String,
}

fn record_error(path: String, e: io::Error) -> RecordError {
    if e.kind() == io::ErrorKind::NotFound {
        RecordError::NotFound(path)
    } else {
        RecordError::Io(e)
    }
}

impl RecordKey for RegistryKey {
    fn open(&self, path: &str) -> Result<Self, RecordError> {
        let full = format!("{}\\{}", self.path, path);
        match self.key.open_subkey_with_flags(path, KEY_READ) {
            Ok(key) => Ok(RegistryKey { key, path: full }),
            Err(e) => Err(record_error(full, e)),
        }
    }

    fn subkey_names(&self) -> Result<Vec<String>, RecordError> {
        let mut names = Vec::new();
        for name in self.key.enum_keys() {
            match name {
                Ok(name) => names.push(name),
                Err(e) => log::debug!("Skipping unreadable subkey of {}: {}", self.path, e),
            }
        }
        Ok(names)
    }

    fn value(&self, name: &str) -> Result<Option<RecordValue>, RecordError> {
        let raw = match self.key.get_raw_value(name) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let value = match raw.vtype {
            REG_DWORD => RecordValue::Int(u32::from_reg_value(&raw)?.into()),
            REG_QWORD => RecordValue::Int(u64::from_reg_value(&raw)? as i64),
            REG_SZ | REG_EXPAND_SZ | REG_MULTI_SZ => RecordValue::Text(String::from_reg_value(&raw)?),
            _ => {
                return Err(RecordError::Conversion {
                    name: name.to_string(),
                    value: format!("{:?}", raw.vtype),
                });
            }
        };
        Ok(Some(value))
    }

    // RegKey closes its handle on drop.
    fn close(self) -> Result<(), RecordError> {
        drop(self.key);
        Ok(())
    }
}

impl RecordStore for WindowsRegistry {
    type Key<'s> = RegistryKey;

    fn open_root(&self, root: Root) -> Result<RegistryKey, RecordError> {
        let (hive, path) = match root {
            Root::LocalMachine => (HKEY_LOCAL_MACHINE, "HKEY_LOCAL_MACHINE"),
            Root::Users => (HKEY_USERS, "HKEY_USERS"),
        };
        Ok(RegistryKey {
            key: RegKey::predef(hive),
            path: path.to_string(),
        })
    }
}
