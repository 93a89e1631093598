//! Items (street-view images) and the immutable catalog they are drawn from.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::CatalogError;
use crate::domain::foundation::ValidationError;

/// One comparable stimulus, usually an image file name.
///
/// `group` carries the optional case/sub-collection label when the catalog
/// is partitioned into named cases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    id: String,
    group: Option<String>,
}

impl Item {
    /// Creates an item, rejecting blank identifiers.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("item_id"));
        }
        Ok(Self { id, group: None })
    }

    /// Attaches a case label. Blank labels are treated as no label.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        let group = group.into();
        self.group = if group.trim().is_empty() { None } else { Some(group) };
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{}/{}", group, self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Read-only pool of items loaded once from an external source.
///
/// # Invariants
///
/// - No two entries are equal, so any 2-combination yields distinct items.
/// - Order is the order of first appearance in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCatalog {
    items: Vec<Item>,
}

impl ItemCatalog {
    /// Builds a catalog, dropping repeated entries.
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| seen.insert(item.clone()))
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ensures at least one pair can be drawn.
    ///
    /// # Errors
    ///
    /// - `InsufficientItems` if fewer than two items are available
    pub fn require_pairable(self) -> Result<Self, CatalogError> {
        if self.items.len() < 2 {
            return Err(CatalogError::InsufficientItems {
                found: self.items.len(),
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> Item {
        Item::new(id).unwrap()
    }

    #[test]
    fn item_rejects_blank_id() {
        assert!(Item::new("   ").is_err());
    }

    #[test]
    fn blank_group_is_dropped() {
        let item = item("a.jpg").with_group(" ");
        assert_eq!(item.group(), None);
    }

    #[test]
    fn display_includes_group() {
        let item = item("a.jpg").with_group("centro");
        assert_eq!(item.to_string(), "centro/a.jpg");
    }

    #[test]
    fn catalog_drops_duplicates_and_keeps_order() {
        let catalog = ItemCatalog::new(vec![item("b.jpg"), item("a.jpg"), item("b.jpg")]);
        let ids: Vec<_> = catalog.items().iter().map(Item::id).collect();
        assert_eq!(ids, vec!["b.jpg", "a.jpg"]);
    }

    #[test]
    fn same_id_in_different_groups_is_distinct() {
        let catalog = ItemCatalog::new(vec![
            item("a.jpg").with_group("north"),
            item("a.jpg").with_group("south"),
        ]);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn require_pairable_rejects_single_item() {
        let result = ItemCatalog::new(vec![item("a.jpg")]).require_pairable();
        assert!(matches!(
            result,
            Err(CatalogError::InsufficientItems { found: 1 })
        ));
    }

    #[test]
    fn require_pairable_accepts_two_items() {
        let catalog = ItemCatalog::new(vec![item("a.jpg"), item("b.jpg")]);
        assert!(catalog.require_pairable().is_ok());
    }
}
