use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledEntity {
    pub display_name: String,
    pub version: String,
    pub parent_display_name: String, // Non-empty for updates to another product
    pub is_update: bool,
    pub uninstall_command: String,   // Literal command line
    pub product_identifier: String,  // Braced product code for msiexec
}

impl InstalledEntity {
    pub fn new(display_name: String, uninstall_command: String) -> Self {
        Self {
            display_name,
            uninstall_command,
            ..Default::default()
        }
    }

    pub fn is_removable(&self) -> bool {
        !self.product_identifier.is_empty() || !self.uninstall_command.is_empty()
    }

    /// Name split on spaces, empty tokens dropped.
    pub fn name_tokens(&self) -> impl Iterator<Item = &str> {
        self.display_name.trim().split(' ').filter(|t| !t.is_empty())
    }

    /// Same program as `other`: equal display name and version.
    pub fn same_program(&self, other: &InstalledEntity) -> bool {
        self.display_name == other.display_name && self.version == other.version
    }
}

/// Installed programs in discovery order, at most one per display name.
#[derive(Debug, Default)]
pub struct Inventory {
    entities: Vec<InstalledEntity>,
    names: HashSet<String>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entity` unless one with the same display name is already
    /// present. Returns whether it was added.
    pub fn insert(&mut self, entity: InstalledEntity) -> bool {
        if self.names.contains(&entity.display_name) {
            return false;
        }
        self.names.insert(entity.display_name.clone());
        self.entities.push(entity);
        true
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InstalledEntity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn sorted_by_name(&self) -> Vec<&InstalledEntity> {
        let mut sorted: Vec<&InstalledEntity> = self.entities.iter().collect();
        sorted.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        sorted
    }
}

impl FromIterator<InstalledEntity> for Inventory {
    fn from_iter<I: IntoIterator<Item = InstalledEntity>>(iter: I) -> Self {
        let mut inventory = Inventory::new();
        for entity in iter {
            inventory.insert(entity);
        }
        inventory
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a InstalledEntity;
    type IntoIter = std::slice::Iter<'a, InstalledEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_display_name_wins() {
        let mut inventory = Inventory::new();
        assert!(inventory.insert(InstalledEntity::new("7-Zip".into(), "first.exe".into())));
        assert!(!inventory.insert(InstalledEntity::new("7-Zip".into(), "second.exe".into())));

        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.iter().next().unwrap().uninstall_command, "first.exe");
    }

    #[test]
    fn name_tokens_skip_empty() {
        let entity = InstalledEntity::new("  Google   Chrome ".into(), String::new());
        assert_eq!(entity.name_tokens().collect::<Vec<_>>(), vec!["Google", "Chrome"]);
    }

    #[test]
    fn removable_needs_command_or_identifier() {
        let mut entity = InstalledEntity::new("Tool".into(), String::new());
        assert!(!entity.is_removable());
        entity.product_identifier = "{90160000-008C-0000-0000-0000000FF1CE}".into();
        assert!(entity.is_removable());
    }

    #[test]
    fn same_program_compares_name_and_version() {
        let mut a = InstalledEntity::new("Git".into(), "a".into());
        let mut b = InstalledEntity::new("Git".into(), "b".into());
        assert!(a.same_program(&b));
        a.version = "2.44".into();
        b.version = "2.45".into();
        assert!(!a.same_program(&b));
    }

    #[test]
    fn sorted_view_orders_by_name() {
        let inventory: Inventory = ["Zoom", "Audacity", "Git"]
            .into_iter()
            .map(|n| InstalledEntity::new(n.into(), "x".into()))
            .collect();
        let names: Vec<_> = inventory.sorted_by_name().into_iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["Audacity", "Git", "Zoom"]);
    }
}
