//! Reconciles the installation records into one inventory.
//!
//! Roots are read in a fixed order and the first record seen for a display
//! name is kept:
//!
//! 1. `HKLM` 32-bit view Uninstall
//! 2. `HKLM` native Uninstall
//! 3. for each identity under `HKU`: its Uninstall key, then its Installer products
//!
//! MSI-managed records are named through `HKLM\Software\Classes\Installer\Products`;
//! per-user installer products are confirmed through `Installer\UserData`.

use crate::model::Inventory;
use crate::sources::installer::UserInstallerSource;
use crate::sources::uninstall::UninstallSource;
use crate::sources::{close_quietly, RecordKey, RecordStore, Root, Source};
use log::{debug, info, warn};

pub const UNINSTALL_WOW64: &str = r"Software\Wow6432Node\Microsoft\Windows\CurrentVersion\Uninstall";
pub const UNINSTALL: &str = r"Software\Microsoft\Windows\CurrentVersion\Uninstall";
pub const CLASSES_PRODUCTS: &str = r"Software\Classes\Installer\Products";
pub const USER_DATA: &str = r"Software\Microsoft\Windows\CurrentVersion\Installer\UserData";
pub const USER_INSTALLER_PRODUCTS: &str = r"Software\Microsoft\Installer\Products";

pub fn build<S: RecordStore>(store: &S, include_updates: bool) -> Inventory {
    let mut inventory = Inventory::new();

    // Without HKLM the per-user roots are still read, minus MSI name lookups.
    let machine = match store.open_root(Root::LocalMachine) {
        Ok(key) => Some(key),
        Err(e) => {
            warn!("Could not open HKEY_LOCAL_MACHINE: {}", e);
            None
        }
    };
    let classes = machine.as_ref().and_then(|m| open_logged(m, CLASSES_PRODUCTS));
    let user_data = machine.as_ref().and_then(|m| open_logged(m, USER_DATA));

    if let Some(machine) = &machine {
        for path in [UNINSTALL_WOW64, UNINSTALL] {
            if let Some(uninstall) = open_logged(machine, path) {
                let source = UninstallSource {
                    uninstall: &uninstall,
                    classes: classes.as_ref(),
                    include_updates,
                };
                collect(&mut inventory, &source, path);
                close_quietly(uninstall, path);
            }
        }
    }

    match store.open_root(Root::Users) {
        Ok(users) => {
            let identities = users.subkey_names().unwrap_or_else(|e| {
                warn!("Could not list user identities: {}", e);
                Vec::new()
            });
            for identity in identities {
                let path = format!(r"{identity}\{UNINSTALL}");
                if let Some(uninstall) = open_logged(&users, &path) {
                    let source = UninstallSource {
                        uninstall: &uninstall,
                        classes: classes.as_ref(),
                        include_updates,
                    };
                    collect(&mut inventory, &source, &path);
                    close_quietly(uninstall, &path);
                }

                let path = format!(r"{identity}\{USER_INSTALLER_PRODUCTS}");
                if let Some(products) = open_logged(&users, &path) {
                    let source = UserInstallerSource {
                        products: &products,
                        user_data: user_data.as_ref(),
                    };
                    collect(&mut inventory, &source, &path);
                    close_quietly(products, &path);
                }
            }
            close_quietly(users, "HKEY_USERS");
        }
        Err(e) => warn!("Could not open HKEY_USERS: {}", e),
    }

    if let Some(classes) = classes {
        close_quietly(classes, CLASSES_PRODUCTS);
    }
    if let Some(user_data) = user_data {
        close_quietly(user_data, USER_DATA);
    }
    if let Some(machine) = machine {
        close_quietly(machine, "HKEY_LOCAL_MACHINE");
    }

    info!("Inventory: {} programs", inventory.len());
    inventory
}

fn open_logged<K: RecordKey>(parent: &K, path: &str) -> Option<K> {
    match parent.open(path) {
        Ok(key) => Some(key),
        Err(e) => {
            debug!("Skipping {}: {}", path, e);
            None
        }
    }
}

fn collect(inventory: &mut Inventory, source: &impl Source, label: &str) {
    match source.scan() {
        Ok(entries) => {
            for entity in entries {
                let name = entity.display_name.clone();
                if !inventory.insert(entity) {
                    debug!("{}: '{}' already listed", label, name);
                }
            }
        }
        Err(e) => warn!("Failed to scan {}: {}", label, e),
    }
}
