//! Catalog-specific error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Failures loading the item catalog.
///
/// All variants block the voting loop; recovery means fixing the external
/// source and retrying.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Item source not found: {}", path.display())]
    SourceMissing { path: PathBuf },

    #[error("Case '{case}' not found in item source")]
    UnknownCase { case: String },

    #[error("Need at least 2 items to build a pair, found {found}")]
    InsufficientItems { found: usize },

    #[error("Invalid item: {0}")]
    InvalidItem(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(String),
}

impl CatalogError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CatalogError::InsufficientItems { .. } => ErrorCode::InsufficientItems,
            CatalogError::InvalidItem(_) => ErrorCode::ValidationFailed,
            CatalogError::SourceMissing { .. }
            | CatalogError::UnknownCase { .. }
            | CatalogError::Io(_) => ErrorCode::CatalogUnavailable,
        }
    }
}

impl From<CatalogError> for DomainError {
    fn from(err: CatalogError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
