//! Catalog configuration

use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

use super::error::ValidationError;
use crate::adapters::catalog::{DirectoryItemSource, DEFAULT_IMAGE_EXTENSIONS};

/// Where stimulus images are read from
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Root image directory
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,

    /// Accepted file extensions, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Optional case subdirectory of `image_dir`
    pub case: Option<String>,
}

impl CatalogConfig {
    /// Builds the item source for this section.
    pub fn source(&self) -> DirectoryItemSource {
        DirectoryItemSource::new(&self.image_dir).with_extensions(self.extensions.iter())
    }

    /// Validate catalog configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.image_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("catalog.image_dir"));
        }
        if self.extensions.is_empty() {
            return Err(ValidationError::MissingRequired("catalog.extensions"));
        }
        for ext in &self.extensions {
            let bare = ext.trim_start_matches('.');
            if bare.is_empty() || !bare.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ValidationError::InvalidExtension(ext.clone()));
            }
        }
        if let Some(case) = &self.case {
            let mut components = Path::new(case).components();
            let single = matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            );
            if !single {
                return Err(ValidationError::InvalidCase);
            }
        }
        Ok(())
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            image_dir: default_image_dir(),
            extensions: default_extensions(),
            case: None,
        }
    }
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_extensions() -> Vec<String> {
    DEFAULT_IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}
