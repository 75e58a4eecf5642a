use crate::error::RecordError;
use crate::guid;
use crate::model::InstalledEntity;
use crate::sources::{close_quietly, flag_value, text_value, RecordKey, Source};
use anyhow::Result;
use log::{debug, info};

/// LocalSystem never owns per-user installs.
pub const SYSTEM_IDENTITY: &str = "S-1-5-18";

/// Per-user Windows Installer products (`HKU\<sid>\Software\Microsoft\Installer\Products`),
/// confirmed against the machine-wide `Installer\UserData` mapping.
pub struct UserInstallerSource<'k, K: RecordKey> {
    pub products: &'k K,
    pub user_data: Option<&'k K>,
}

impl<K: RecordKey> Source for UserInstallerSource<'_, K> {
    fn scan(&self) -> Result<Vec<InstalledEntity>> {
        let Some(user_data) = self.user_data else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for packed in self.products.subkey_names()? {
            match self.read_product(user_data, &packed) {
                Ok(Some(entity)) => entries.push(entity),
                Ok(None) => {}
                Err(e) => debug!("{} - {}", packed, e),
            }
        }
        info!("UserInstallerSource: found {} entries", entries.len());
        Ok(entries)
    }
}

impl<K: RecordKey> UserInstallerSource<'_, K> {
    fn read_product(
        &self,
        user_data: &K,
        packed: &str,
    ) -> Result<Option<InstalledEntity>, RecordError> {
        for identity in user_data.subkey_names()? {
            if identity == SYSTEM_IDENTITY {
                continue;
            }
            let machine_products = match user_data.open(&format!(r"{identity}\Products")) {
                Ok(key) => key,
                Err(e) => {
                    debug!("{} - {}", identity, e);
                    continue;
                }
            };

            let found = self.resolve(&machine_products, packed);
            close_quietly(machine_products, "user data products");
            if let Some(entity) = found? {
                return Ok(Some(entity));
            }
        }
        Ok(None)
    }

    fn resolve(&self, machine_products: &K, packed: &str) -> Result<Option<InstalledEntity>, RecordError> {
        let Some(matched) = machine_products
            .subkey_names()?
            .into_iter()
            .find(|name| name.eq_ignore_ascii_case(packed))
        else {
            return Ok(None);
        };

        let properties = machine_products.open(&format!(r"{matched}\InstallProperties"))?;
        if flag_value(&properties, "SystemComponent")? {
            return Ok(None);
        }

        let record = self.products.open(packed)?;
        let display_name = text_value(&record, "ProductName")?;
        if display_name.is_empty() {
            return Ok(None);
        }

        let version = text_value(&properties, "DisplayVersion").unwrap_or_else(|e| {
            debug!("{} - {}", packed, e);
            String::new()
        });
        let product_identifier = match guid::decode_from_compressed(&matched) {
            Ok(dashed) => guid::braced(&dashed),
            Err(e) => {
                debug!("{} - {}", packed, e);
                return Ok(None);
            }
        };

        Ok(Some(InstalledEntity {
            display_name,
            version,
            uninstall_command: text_value(&record, "UninstallString")?,
            product_identifier,
            ..Default::default()
        }))
    }
}
