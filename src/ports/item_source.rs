//! Item Source Port - Interface for loading the item catalog.

use async_trait::async_trait;

use crate::domain::catalog::{CatalogError, ItemCatalog};

/// Port for enumerating comparable items.
///
/// The source is read-only. A source may be partitioned into named cases
/// (sub-collections); `None` selects the unpartitioned root.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Loads the catalog for `case`.
    ///
    /// # Errors
    ///
    /// - `SourceMissing` / `UnknownCase` if the source or case does not exist
    /// - `InsufficientItems` if fewer than two items are usable
    async fn load(&self, case: Option<&str>) -> Result<ItemCatalog, CatalogError>;

    /// Names of the available cases, sorted.
    async fn cases(&self) -> Result<Vec<String>, CatalogError>;
}
