//! Filesystem Item Source Adapter
//!
//! Treats image files in a directory as the item catalog. Sub-directories
//! are named cases; loading a case yields items labelled with that case.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::domain::catalog::{CatalogError, Item, ItemCatalog};
use crate::ports::ItemSource;

/// File extensions recognised as images by default.
pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// Directory-backed item catalog.
#[derive(Debug, Clone)]
pub struct DirectoryItemSource {
    root: PathBuf,
    extensions: Vec<String>,
}

impl DirectoryItemSource {
    /// Create a source rooted at `root` recognising the default image extensions.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }

    /// Replace the recognised extensions (compared case-insensitively, no dot).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_image(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|known| *known == ext)
            })
            .unwrap_or(false)
    }

    /// Resolve a case name to its directory, refusing anything but a plain name.
    fn case_dir(&self, case: &str) -> Result<PathBuf, CatalogError> {
        let mut components = Path::new(case).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(case)),
            _ => Err(CatalogError::UnknownCase {
                case: case.to_string(),
            }),
        }
    }

    async fn ensure_root(&self) -> Result<(), CatalogError> {
        match fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            _ => Err(CatalogError::SourceMissing {
                path: self.root.clone(),
            }),
        }
    }
}

#[async_trait]
impl ItemSource for DirectoryItemSource {
    async fn load(&self, case: Option<&str>) -> Result<ItemCatalog, CatalogError> {
        self.ensure_root().await?;

        let dir = match case {
            Some(name) => {
                let dir = self.case_dir(name)?;
                if !fs::metadata(&dir).await.map(|m| m.is_dir()).unwrap_or(false) {
                    return Err(CatalogError::UnknownCase {
                        case: name.to_string(),
                    });
                }
                dir
            }
            None => self.root.clone(),
        };

        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| CatalogError::Io(e.to_string()))?;
        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CatalogError::Io(e.to_string()))?
        {
            let path = entry.path();
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file || !self.is_image(&path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();

        let mut items = Vec::with_capacity(names.len());
        for name in names {
            let item = Item::new(name)?;
            items.push(match case {
                Some(label) => item.with_group(label),
                None => item,
            });
        }

        let catalog = ItemCatalog::new(items).require_pairable()?;
        tracing::debug!(
            root = %self.root.display(),
            case = case.unwrap_or("-"),
            items = catalog.len(),
            "Loaded item catalog"
        );
        Ok(catalog)
    }

    async fn cases(&self) -> Result<Vec<String>, CatalogError> {
        self.ensure_root().await?;

        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| CatalogError::Io(e.to_string()))?;
        let mut cases = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CatalogError::Io(e.to_string()))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if is_dir {
                if let Some(name) = entry.file_name().to_str() {
                    cases.push(name.to_string());
                }
            }
        }
        cases.sort();
        Ok(cases)
    }
}
