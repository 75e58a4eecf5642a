use crate::error::RecordError;
use crate::guid;
use crate::model::InstalledEntity;
use crate::sources::{flag_value, text_value, RecordKey, Source};
use anyhow::Result;
use log::{debug, info};
use regex::Regex;
use std::sync::LazyLock;

static HOTFIX_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new("KB[0-9]{6}$").unwrap());

const UPDATE_RELEASE_TYPES: [&str; 3] = ["Security Update", "Update Rollup", "Hotfix"];

/// Programs listed under one `...\CurrentVersion\Uninstall` key.
pub struct UninstallSource<'k, K: RecordKey> {
    pub uninstall: &'k K,
    /// `Software\Classes\Installer\Products`, used to name MSI-managed records.
    pub classes: Option<&'k K>,
    pub include_updates: bool,
}

impl<K: RecordKey> Source for UninstallSource<'_, K> {
    fn scan(&self) -> Result<Vec<InstalledEntity>> {
        let mut entries = Vec::new();
        for name in self.uninstall.subkey_names()? {
            match self.read_record(&name) {
                Ok(Some(entity)) => entries.push(entity),
                Ok(None) => {}
                Err(e) => debug!("{} - {}", name, e),
            }
        }
        info!("UninstallSource: found {} entries", entries.len());
        Ok(entries)
    }
}

impl<K: RecordKey> UninstallSource<'_, K> {
    fn read_record(&self, key_name: &str) -> Result<Option<InstalledEntity>, RecordError> {
        let record = self.uninstall.open(key_name)?;

        let system_component = flag_value(&record, "SystemComponent").unwrap_or_else(|e| {
            debug!("{} - {}", key_name, e);
            false
        });
        if system_component {
            return Ok(None);
        }

        if flag_value(&record, "WindowsInstaller")? {
            return self.read_installer_record(key_name, &record);
        }

        let release_type = text_value(&record, "ReleaseType")?;
        let is_update = HOTFIX_KEY.is_match(key_name)
            || !text_value(&record, "ParentKeyName")?.is_empty()
            || UPDATE_RELEASE_TYPES.contains(&release_type.as_str());
        if is_update && !self.include_updates {
            return Ok(None);
        }

        let display_name = text_value(&record, "DisplayName")?;
        let uninstall_command = text_value(&record, "UninstallString")?;
        if display_name.is_empty() || uninstall_command.is_empty() {
            return Ok(None);
        }

        Ok(Some(InstalledEntity {
            display_name,
            version: version_of(&record, key_name),
            parent_display_name: text_value(&record, "ParentDisplayName")?,
            is_update,
            uninstall_command,
            product_identifier: String::new(),
        }))
    }

    /// MSI-managed records are named by their product code; the product
    /// name lives under the packed code in the class registration.
    fn read_installer_record(
        &self,
        key_name: &str,
        record: &K,
    ) -> Result<Option<InstalledEntity>, RecordError> {
        let Some(classes) = self.classes else {
            return Ok(None);
        };
        let packed = match guid::encode_to_compressed(key_name) {
            Ok(packed) => packed,
            Err(e) => {
                debug!("{} - {}", key_name, e);
                return Ok(None);
            }
        };
        let product = match classes.open(&packed) {
            Ok(product) => product,
            Err(RecordError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let display_name = text_value(&product, "ProductName")?;
        if display_name.is_empty() {
            return Ok(None);
        }

        Ok(Some(InstalledEntity {
            display_name,
            version: version_of(record, key_name),
            parent_display_name: text_value(record, "ParentDisplayName")?,
            is_update: false,
            uninstall_command: text_value(record, "UninstallString")?,
            product_identifier: key_name.to_string(),
        }))
    }
}

fn version_of<K: RecordKey>(record: &K, key_name: &str) -> String {
    text_value(record, "DisplayVersion").unwrap_or_else(|e| {
        debug!("{} - {}", key_name, e);
        String::new()
    })
}
