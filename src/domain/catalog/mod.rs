//! Catalog domain module.
//!
//! The read-only vocabulary a survey draws from: the [`Item`]s shown to
//! participants and the closed set of [`Adjective`]s they are judged on.

mod adjective;
mod errors;
mod item;

pub use adjective::Adjective;
pub use errors::CatalogError;
pub use item::{Item, ItemCatalog};
