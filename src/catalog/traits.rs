//! Trait abstraction for catalog providers to enable mocking in tests

use super::CatalogEntry;

/// Supplies the fixed, ordered entries a repeated-control list is built from.
///
/// The engine only reads the entries; it never mutates them.
#[cfg_attr(test, mockall::automock)]
pub trait CatalogProvider {
    /// All selectable entries, in display order
    fn entries(&self) -> Vec<CatalogEntry>;
}
