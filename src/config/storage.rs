//! Storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;
use crate::adapters::storage::CsvFileSink;
use crate::application::PersistenceMode;

/// Where and when responses are written
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Per-decision or end-of-session delivery
    #[serde(default)]
    pub mode: PersistenceMode,

    /// Directory holding results files and exports
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// One results file per participant role
    #[serde(default = "default_partition_by_role")]
    pub partition_by_role: bool,

    /// Results file name when not partitioned
    #[serde(default = "default_results_file")]
    pub results_file: String,

    /// Local file that catches rows the primary sink rejects
    #[serde(default = "default_fallback_file")]
    pub fallback_file: String,
}

impl StorageConfig {
    /// Builds the primary results sink.
    pub fn results_sink(&self) -> CsvFileSink {
        if self.partition_by_role {
            CsvFileSink::per_role(&self.results_dir)
        } else {
            CsvFileSink::new(self.results_dir.join(&self.results_file))
        }
    }

    /// Builds the fallback sink.
    pub fn fallback_sink(&self) -> CsvFileSink {
        CsvFileSink::new(self.fallback_path())
    }

    pub fn fallback_path(&self) -> PathBuf {
        self.results_dir.join(&self.fallback_file)
    }

    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.results_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("storage.results_dir"));
        }
        if self.fallback_file.trim().is_empty() {
            return Err(ValidationError::MissingRequired("storage.fallback_file"));
        }
        if !self.partition_by_role && self.results_file.trim().is_empty() {
            return Err(ValidationError::MissingRequired("storage.results_file"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mode: PersistenceMode::default(),
            results_dir: default_results_dir(),
            partition_by_role: default_partition_by_role(),
            results_file: default_results_file(),
            fallback_file: default_fallback_file(),
        }
    }
}

fn default_results_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_partition_by_role() -> bool {
    true
}

fn default_results_file() -> String {
    "results.csv".to_string()
}

fn default_fallback_file() -> String {
    "fallback_responses.csv".to_string()
}
