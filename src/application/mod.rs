//! Application layer - Command handlers and response delivery.
//!
//! Orchestrates the survey aggregate and the response sinks. The domain
//! layer decides what was chosen; this layer decides where it is written.

pub mod handlers;
mod response_store;

pub use handlers::{
    CastVoteCommand, CastVoteHandler, CastVoteResult, CompletionReport, FinishSurveyHandler,
};
pub use response_store::{FlushError, PersistenceMode, ResponseStore, SyncStatus};
