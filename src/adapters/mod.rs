//! Adapters - Implementations of port interfaces.
//!
//! - `catalog` - Item sources (filesystem directories)
//! - `storage` - Response sinks (CSV files, remote worksheets, memory)

pub mod catalog;
pub mod storage;

pub use catalog::DirectoryItemSource;
pub use storage::{CsvFileSink, InMemorySink, InMemoryTable, TableSink};
