//! Remote Table Port - Whole-sheet read/write access to a spreadsheet.
//!
//! Mirrors what hosted spreadsheet APIs typically offer: read every row of
//! a worksheet, or overwrite the worksheet. There is no atomic append, so
//! callers that read, merge and write back race with other writers.

use async_trait::async_trait;

use super::SinkError;

/// Port for a worksheet-keyed remote tabular store.
#[async_trait]
pub trait RemoteTable: Send + Sync {
    /// Reads every row of `worksheet`, header row included.
    ///
    /// A worksheet that does not exist yet reads as empty.
    async fn read_all(&self, worksheet: &str) -> Result<Vec<Vec<String>>, SinkError>;

    /// Replaces the contents of `worksheet` with `rows`.
    async fn write_all(&self, worksheet: &str, rows: Vec<Vec<String>>) -> Result<(), SinkError>;
}
