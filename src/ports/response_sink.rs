//! Response Sink Port - Interface for durable decision storage.
//!
//! A sink is wherever response rows end up: an append-only local file, a
//! remote worksheet, or memory in tests. Sinks only ever append; the
//! in-memory decision log stays the source of truth until a write succeeds.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::responses::{ExportError, ResponseRow};

/// Errors that can occur while writing to a sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("Sink unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to serialize rows: {0}")]
    Serialization(String),

    /// The first `written` rows of the batch were stored before the failure.
    #[error("Sink stored {written} row(s) before failing: {reason}")]
    PartialWrite { written: usize, reason: String },
}

impl SinkError {
    /// Rows known to be durably stored despite the error.
    pub fn rows_written(&self) -> usize {
        match self {
            SinkError::PartialWrite { written, .. } => *written,
            _ => 0,
        }
    }
}

impl From<ExportError> for SinkError {
    fn from(err: ExportError) -> Self {
        SinkError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Io(err.to_string())
    }
}

impl From<SinkError> for DomainError {
    fn from(err: SinkError) -> Self {
        DomainError::new(ErrorCode::SinkUnavailable, err.to_string())
    }
}

/// Port for appending response rows to durable storage.
///
/// # Contract
///
/// - Rows are stored in slice order.
/// - On failure after storing a prefix of the batch, implementations
///   report [`SinkError::PartialWrite`] with the prefix length.
/// - Calls either succeed or fail before returning; no background retry.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &str;

    /// Appends `rows` in order.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if any row could not be stored.
    async fn append(&self, rows: &[ResponseRow]) -> Result<(), SinkError>;
}
