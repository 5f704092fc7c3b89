//! Lookup of asset definitions by workbook path.

use crate::asset::AssetDefinition;
use indexmap::IndexMap;
use rowcast_sheet::is_excel_path;
use std::path::Path;

/// Whether `path` names a workbook or CSV file worth importing.
///
/// Office lock files (`~$Items.xlsx`) are never importable.
#[must_use]
pub fn is_importable_path(path: &Path) -> bool {
    let is_lock_file = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("~$"));
    if is_lock_file {
        return false;
    }

    is_excel_path(path)
        || path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("tsv"))
}

/// Asset definitions keyed by workbook file stem.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    assets: IndexMap<String, AssetDefinition>,
}

impl AssetCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset, replacing any asset bound to the same workbook.
    pub fn add(&mut self, asset: AssetDefinition) -> Option<AssetDefinition> {
        let key = asset.excel_name().to_string();
        let previous = self.assets.insert(key, asset);
        if let Some(previous) = &previous {
            tracing::warn!(
                workbook = previous.excel_name(),
                asset = %previous.name,
                "asset replaced"
            );
        }
        previous
    }

    #[must_use]
    pub fn get(&self, excel_name: &str) -> Option<&AssetDefinition> {
        self.assets.get(excel_name)
    }

    /// The asset importing the workbook at `path`, if any.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> Option<&AssetDefinition> {
        if !is_importable_path(path) {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        self.assets.get(stem)
    }

    pub fn assets(&self) -> impl Iterator<Item = &AssetDefinition> {
        self.assets.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl FromIterator<AssetDefinition> for AssetCatalog {
    fn from_iter<I: IntoIterator<Item = AssetDefinition>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for asset in iter {
            catalog.add(asset);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> AssetCatalog {
        [
            AssetDefinition::new("Items"),
            AssetDefinition::new("Monsters").with_excel_name("MonsterTable"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_resolve_by_stem() {
        let catalog = catalog();
        assert_eq!(
            catalog.resolve(Path::new("data/Items.xlsx")).map(|a| a.name.as_str()),
            Some("Items")
        );
        assert_eq!(
            catalog
                .resolve(Path::new("MonsterTable.XLS"))
                .map(|a| a.name.as_str()),
            Some("Monsters")
        );
        assert!(catalog.resolve(Path::new("Monsters.xlsx")).is_none());
    }

    #[test]
    fn test_resolve_ignores_other_files() {
        let catalog = catalog();
        assert!(catalog.resolve(Path::new("Items.txt")).is_none());
        assert!(catalog.resolve(Path::new("~$Items.xlsx")).is_none());
        assert!(catalog.resolve(Path::new("Items")).is_none());
        assert!(catalog.resolve(Path::new("Items.csv")).is_some());
    }

    #[test]
    fn test_add_replaces() {
        let mut catalog = catalog();
        let previous = catalog.add(AssetDefinition::new("Other").with_excel_name("Items"));
        assert_eq!(previous.map(|a| a.name), Some("Items".to_string()));
        assert_eq!(catalog.len(), 2);
    }
}
