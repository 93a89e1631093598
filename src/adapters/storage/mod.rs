//! Storage Adapters
//!
//! Implementations of the ResponseSink and RemoteTable ports.
//!
//! ## Available Adapters
//!
//! - **CsvFileSink** - Append-only CSV files on disk (single file or one per role)
//! - **TableSink** - Read-merge-write against a remote worksheet, idempotent by decision id
//! - **InMemorySink** - Rows kept in memory (testing/development)
//! - **InMemoryTable** - Worksheets kept in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{CsvFileSink, InMemoryTable, TableSink};
//!
//! // Production: per-role results files
//! let sink = CsvFileSink::per_role("./results");
//!
//! // Remote worksheet
//! let sink = TableSink::new(sheets_client, "responses");
//! ```

mod csv_file_sink;
mod in_memory_sink;
mod in_memory_table;
mod table_sink;

pub use csv_file_sink::CsvFileSink;
pub use in_memory_sink::InMemorySink;
pub use in_memory_table::InMemoryTable;
pub use table_sink::TableSink;
