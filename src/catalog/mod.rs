//! Selectable catalog entries backing repeated-control lists

mod traits;

use serde::{Deserialize, Serialize};

pub use traits::CatalogProvider;

#[cfg(test)]
pub use traits::MockCatalogProvider;

/// One selectable entry (e.g. a course)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: u32,
    pub name: String,
}

impl CatalogEntry {
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

/// A catalog held in memory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCatalog {
    pub entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Build a catalog from display names, numbering ids from 1
    pub fn from_names(names: &[&str]) -> Self {
        let entries = names
            .iter()
            .enumerate()
            .map(|(i, name)| CatalogEntry::new(i as u32 + 1, name))
            .collect();
        Self { entries }
    }
}

impl CatalogProvider for StaticCatalog {
    fn entries(&self) -> Vec<CatalogEntry> {
        self.entries.clone()
    }
}
