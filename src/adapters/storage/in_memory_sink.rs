//! In-Memory Response Sink Adapter
//!
//! Keeps rows in memory. Useful for testing and development; failures can be
//! scripted to exercise fallback and retry paths.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::responses::ResponseRow;
use crate::ports::{ResponseSink, SinkError};

#[derive(Debug, Default)]
struct FailurePlan {
    /// Number of upcoming calls that fail outright.
    fail_calls: usize,
    /// Next call stores this many rows then fails.
    partial_after: Option<usize>,
}

/// In-memory sink.
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    rows: Arc<RwLock<Vec<ResponseRow>>>,
    plan: Arc<RwLock<FailurePlan>>,
    calls: Arc<RwLock<usize>>,
}

impl InMemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `calls` appends fail with `Unavailable`.
    pub async fn fail_next(&self, calls: usize) {
        self.plan.write().await.fail_calls = calls;
    }

    /// Make the next append store `rows` rows and then fail.
    pub async fn fail_after(&self, rows: usize) {
        self.plan.write().await.partial_after = Some(rows);
    }

    /// Snapshot of stored rows
    pub async fn rows(&self) -> Vec<ResponseRow> {
        self.rows.read().await.clone()
    }

    pub async fn row_count(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Number of append calls received, failed ones included
    pub async fn call_count(&self) -> usize {
        *self.calls.read().await
    }
}

#[async_trait]
impl ResponseSink for InMemorySink {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn append(&self, rows: &[ResponseRow]) -> Result<(), SinkError> {
        *self.calls.write().await += 1;

        let mut plan = self.plan.write().await;
        if plan.fail_calls > 0 {
            plan.fail_calls -= 1;
            return Err(SinkError::Unavailable("scripted failure".to_string()));
        }
        if let Some(limit) = plan.partial_after.take() {
            if limit < rows.len() {
                self.rows.write().await.extend_from_slice(&rows[..limit]);
                return Err(SinkError::PartialWrite {
                    written: limit,
                    reason: "scripted failure".to_string(),
                });
            }
        }
        drop(plan);

        self.rows.write().await.extend_from_slice(rows);
        Ok(())
    }
}
