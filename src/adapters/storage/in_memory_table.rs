//! In-Memory Remote Table Adapter
//!
//! Worksheets kept in a shared map. Stands in for a hosted spreadsheet in
//! tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{RemoteTable, SinkError};

/// In-memory worksheet store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTable {
    sheets: Arc<RwLock<HashMap<String, Vec<Vec<String>>>>>,
    failing_writes: Arc<RwLock<usize>>,
}

impl InMemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `writes` calls to `write_all` fail.
    pub async fn fail_next_writes(&self, writes: usize) {
        *self.failing_writes.write().await = writes;
    }

    /// Snapshot of a worksheet, header row included.
    pub async fn sheet(&self, worksheet: &str) -> Vec<Vec<String>> {
        self.sheets
            .read()
            .await
            .get(worksheet)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl RemoteTable for InMemoryTable {
    async fn read_all(&self, worksheet: &str) -> Result<Vec<Vec<String>>, SinkError> {
        let snapshot = self.sheet(worksheet).await;
        // a network round trip: lets other tasks interleave between read and write
        tokio::task::yield_now().await;
        Ok(snapshot)
    }

    async fn write_all(&self, worksheet: &str, rows: Vec<Vec<String>>) -> Result<(), SinkError> {
        {
            let mut failing = self.failing_writes.write().await;
            if *failing > 0 {
                *failing -= 1;
                return Err(SinkError::Unavailable("worksheet write rejected".to_string()));
            }
        }
        self.sheets
            .write()
            .await
            .insert(worksheet.to_string(), rows);
        Ok(())
    }
}
