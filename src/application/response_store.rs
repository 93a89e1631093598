//! ResponseStore - Durable recording of a session's decision log.
//!
//! Two delivery modes share one store:
//!
//! - **Per-decision**: [`ResponseStore::append`] writes each decision as it is
//!   made. A failed write goes to the local fallback sink instead and the
//!   row stays pending.
//! - **End-of-session**: [`ResponseStore::flush`] writes the whole log once
//!   the session completes. A failed flush hands back an [`ExportArtifact`]
//!   of the full log so nothing is lost.
//!
//! The store remembers how much of the log is already persisted. A retried
//! flush only sends the remainder, so it never duplicates rows, including
//! after a sink stored part of a batch before failing.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::domain::foundation::{DecisionId, DomainError, ErrorCode};
use crate::domain::responses::{ExportArtifact, ExportError, ResponseRow};
use crate::domain::survey::Decision;
use crate::ports::{ResponseSink, SinkError};

/// When decisions are written to the primary sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceMode {
    /// Write every decision as soon as it is recorded.
    #[default]
    PerDecision,
    /// Write the whole log once the session completes.
    EndOfSession,
}

/// A flush that did not reach the primary sink.
#[derive(Debug, Clone, Error)]
#[error("Flush failed: {source}")]
pub struct FlushError {
    pub source: SinkError,
    /// The full log, for the participant to download.
    pub export: Option<ExportArtifact>,
}

/// Where a session's rows stand relative to the primary sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Every decision so far is stored.
    Synced,
    /// Rows are held back until the next flush.
    Pending,
    /// The primary sink failed; the export holds the full log.
    Degraded {
        reason: String,
        export: Option<ExportArtifact>,
    },
}

impl SyncStatus {
    /// Maps a flush outcome to the status shown to the participant.
    pub fn from_flush(result: Result<usize, FlushError>) -> Self {
        match result {
            Ok(_) => SyncStatus::Synced,
            Err(err) => SyncStatus::Degraded {
                reason: err.source.to_string(),
                export: err.export,
            },
        }
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, SyncStatus::Synced)
    }
}

#[derive(Debug, Default)]
struct StoreState {
    /// Ids already stored by the primary sink.
    persisted: Vec<DecisionId>,
    /// Per-decision rows the primary sink rejected.
    pending: Vec<ResponseRow>,
}

/// Persists decision logs through a primary sink with a local fallback.
pub struct ResponseStore {
    primary: Arc<dyn ResponseSink>,
    fallback: Option<Arc<dyn ResponseSink>>,
    state: Mutex<StoreState>,
}

impl ResponseStore {
    pub fn new(primary: Arc<dyn ResponseSink>) -> Self {
        Self {
            primary,
            fallback: None,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Adds a local sink that receives rows the primary sink rejects.
    pub fn with_fallback(mut self, fallback: Arc<dyn ResponseSink>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Writes one decision to the primary sink.
    ///
    /// On failure the row is written to the fallback sink (when configured)
    /// and kept pending for the next [`flush`](Self::flush).
    ///
    /// # Errors
    ///
    /// Returns the primary sink's error. The session should carry on.
    pub async fn append(&self, decision: &Decision) -> Result<(), SinkError> {
        let row = ResponseRow::from(decision);
        let mut state = self.state.lock().await;

        match self.primary.append(std::slice::from_ref(&row)).await {
            Ok(()) => {
                state.persisted.push(decision.id);
                Ok(())
            }
            Err(err) => {
                warn!(
                    sink = self.primary.name(),
                    decision_id = %decision.id,
                    error = %err,
                    "Primary sink rejected decision"
                );
                if let Some(fallback) = &self.fallback {
                    if let Err(fallback_err) = fallback.append(std::slice::from_ref(&row)).await {
                        error!(
                            sink = fallback.name(),
                            error = %fallback_err,
                            "Fallback sink rejected decision; kept in memory only"
                        );
                    }
                }
                state.pending.push(row);
                Err(err)
            }
        }
    }

    /// Writes every decision of `decisions` the primary sink does not hold yet.
    ///
    /// Returns the number of rows written by this call.
    ///
    /// # Errors
    ///
    /// Returns a [`FlushError`] carrying an export of the whole log when
    /// the primary sink fails. Rows it stored before failing are remembered.
    pub async fn flush(&self, decisions: &[Decision]) -> Result<usize, FlushError> {
        let mut state = self.state.lock().await;

        let rows: Vec<ResponseRow> = decisions
            .iter()
            .filter(|d| !state.persisted.contains(&d.id))
            .map(ResponseRow::from)
            .collect();
        if rows.is_empty() {
            state.pending.clear();
            return Ok(0);
        }

        match self.primary.append(&rows).await {
            Ok(()) => {
                state.persisted.extend(rows.iter().map(|r| r.decision_id));
                state.pending.clear();
                info!(sink = self.primary.name(), rows = rows.len(), "Flushed decisions");
                Ok(rows.len())
            }
            Err(err) => {
                let written = err.rows_written().min(rows.len());
                state
                    .persisted
                    .extend(rows[..written].iter().map(|r| r.decision_id));
                state
                    .pending
                    .retain(|r| !rows[..written].iter().any(|w| w.decision_id == r.decision_id));
                warn!(
                    sink = self.primary.name(),
                    written,
                    remaining = rows.len() - written,
                    error = %err,
                    "Flush failed; offering export"
                );

                let export = match self.export(decisions) {
                    Ok(artifact) => Some(artifact),
                    Err(export_err) => {
                        error!(error = %export_err, "Could not build fallback export");
                        None
                    }
                };
                Err(FlushError {
                    source: err,
                    export,
                })
            }
        }
    }

    /// Renders `decisions` as a downloadable CSV.
    pub fn export(&self, decisions: &[Decision]) -> Result<ExportArtifact, ExportError> {
        let file_name = match decisions.first() {
            Some(first) => format!(
                "responses_{}_{}.csv",
                first.role.as_str().to_lowercase(),
                first.session_id
            ),
            None => "responses.csv".to_string(),
        };
        ExportArtifact::from_decisions(file_name, decisions)
    }

    /// Rows rejected by the primary sink and not yet flushed.
    pub async fn pending_count(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    /// Decisions the primary sink has stored.
    pub async fn persisted_count(&self) -> usize {
        self.state.lock().await.persisted.len()
    }

    pub async fn is_persisted(&self, id: &DecisionId) -> bool {
        self.state.lock().await.persisted.contains(id)
    }

    /// Forgets delivery bookkeeping, for a new session.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.persisted.clear();
        state.pending.clear();
    }
}

impl From<FlushError> for DomainError {
    fn from(err: FlushError) -> Self {
        DomainError::new(ErrorCode::SinkUnavailable, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySink;
    use crate::domain::catalog::{Adjective, Item};
    use crate::domain::foundation::{SessionId, Timestamp};
    use crate::domain::survey::{ParticipantRole, Side};

    fn log(n: usize) -> Vec<Decision> {
        let session_id = SessionId::new();
        (0..n)
            .map(|i| Decision {
                id: DecisionId::new(),
                session_id,
                left: Item::new(format!("{i}.jpg")).unwrap(),
                right: Item::new("z.jpg").unwrap(),
                chosen: Side::Left,
                adjective: Adjective::Safe,
                position: i,
                decided_at: Timestamp::now(),
                role: ParticipantRole::Resident,
                language: None,
            })
            .collect()
    }

    fn store_with(primary: &InMemorySink) -> ResponseStore {
        ResponseStore::new(Arc::new(primary.clone()))
    }

    #[tokio::test]
    async fn append_writes_single_row() {
        let primary = InMemorySink::new();
        let store = store_with(&primary);
        let decisions = log(1);

        store.append(&decisions[0]).await.unwrap();

        assert_eq!(primary.row_count().await, 1);
        assert_eq!(store.persisted_count().await, 1);
        assert_eq!(store.pending_count().await, 0);
    }

    #[tokio::test]
    async fn append_failure_uses_fallback_and_keeps_row() {
        let primary = InMemorySink::new();
        let fallback = InMemorySink::new();
        primary.fail_next(1).await;
        let store = store_with(&primary).with_fallback(Arc::new(fallback.clone()));
        let decisions = log(1);

        let result = store.append(&decisions[0]).await;

        assert!(matches!(result, Err(SinkError::Unavailable(_))));
        assert_eq!(fallback.row_count().await, 1);
        assert_eq!(store.pending_count().await, 1);
        assert!(!store.is_persisted(&decisions[0].id).await);
    }

    #[tokio::test]
    async fn flush_after_failed_append_sends_pending_row() {
        let primary = InMemorySink::new();
        primary.fail_next(1).await;
        let store = store_with(&primary);
        let decisions = log(2);

        store.append(&decisions[0]).await.unwrap_err();
        store.append(&decisions[1]).await.unwrap();
        let written = store.flush(&decisions).await.unwrap();

        assert_eq!(written, 1);
        assert_eq!(primary.row_count().await, 2);
        assert_eq!(store.pending_count().await, 0);
    }

    #[tokio::test]
    async fn flush_writes_log_in_order() {
        let primary = InMemorySink::new();
        let store = store_with(&primary);
        let decisions = log(4);

        assert_eq!(store.flush(&decisions).await.unwrap(), 4);

        let ids: Vec<_> = primary.rows().await.iter().map(|r| r.decision_id).collect();
        let expected: Vec<_> = decisions.iter().map(|d| d.id).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn failed_flush_offers_full_export() {
        let primary = InMemorySink::new();
        primary.fail_next(1).await;
        let store = store_with(&primary);
        let decisions = log(4);

        let err = store.flush(&decisions).await.unwrap_err();

        let export = err.export.expect("export should be offered");
        assert_eq!(export.rows, 4);
        assert_eq!(export.decisions().unwrap(), decisions);
        assert!(export.file_name.starts_with("responses_resident_"));
    }

    #[tokio::test]
    async fn retry_after_partial_write_does_not_duplicate() {
        let primary = InMemorySink::new();
        primary.fail_after(2).await;
        let store = store_with(&primary);
        let decisions = log(4);

        let err = store.flush(&decisions).await.unwrap_err();
        assert_eq!(err.source.rows_written(), 2);
        assert_eq!(store.persisted_count().await, 2);

        assert_eq!(store.flush(&decisions).await.unwrap(), 2);
        let ids: Vec<_> = primary.rows().await.iter().map(|r| r.decision_id).collect();
        let expected: Vec<_> = decisions.iter().map(|d| d.id).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn second_flush_is_noop() {
        let primary = InMemorySink::new();
        let store = store_with(&primary);
        let decisions = log(3);

        store.flush(&decisions).await.unwrap();
        assert_eq!(store.flush(&decisions).await.unwrap(), 0);
        assert_eq!(primary.row_count().await, 3);
        assert_eq!(primary.call_count().await, 1);
    }

    #[tokio::test]
    async fn reset_forgets_bookkeeping() {
        let primary = InMemorySink::new();
        let store = store_with(&primary);
        store.flush(&log(2)).await.unwrap();

        store.reset().await;
        assert_eq!(store.persisted_count().await, 0);
    }

    #[test]
    fn empty_log_exports_header_only() {
        let store = ResponseStore::new(Arc::new(InMemorySink::new()));
        let artifact = store.export(&[]).unwrap();
        assert_eq!(artifact.file_name, "responses.csv");
        assert_eq!(artifact.rows, 0);
    }
}
