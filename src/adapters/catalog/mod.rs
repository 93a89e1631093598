//! Catalog Adapters
//!
//! Implementations of the ItemSource port.

mod directory_source;

pub use directory_source::{DirectoryItemSource, DEFAULT_IMAGE_EXTENSIONS};
