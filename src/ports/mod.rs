//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ItemSource` - Where comparable items come from
//! - `ResponseSink` - Where decisions are persisted
//! - `RemoteTable` - Whole-worksheet access to a hosted spreadsheet

mod item_source;
mod remote_table;
mod response_sink;

pub use item_source::ItemSource;
pub use remote_table::RemoteTable;
pub use response_sink::{ResponseSink, SinkError};
