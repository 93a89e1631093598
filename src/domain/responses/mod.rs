//! Response records module.
//!
//! Maps decisions onto the shared tabular schema ([`ResponseRow`]) and
//! renders/parses that schema as CSV for files and fallback exports.

mod export;
mod row;

pub use export::{parse_export, read_rows, render_csv, ExportArtifact};
pub use row::{latest_per_position, ResponseRow};

use thiserror::Error;

/// Errors rendering or parsing tabular exports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Invalid row{}: {reason}", .line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    InvalidRow { line: Option<usize>, reason: String },
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv(err.to_string())
    }
}
