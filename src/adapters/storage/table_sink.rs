//! Remote Table Sink Adapter
//!
//! Appends rows to a worksheet that only supports whole-sheet reads and
//! writes. Each append reads the sheet, merges in rows whose `decision_id`
//! is not already present and writes the sheet back. A row for a session and
//! position already in the sheet replaces that row in place, so a vote that
//! was undone and re-decided leaves one row per slot.
//!
//! The terminal binary does not wire this sink; its storage config only
//! builds CSV files. Supply a [`RemoteTable`] client to use it.
//!
//! ## Concurrency
//!
//! Read-merge-write is not atomic. Appends through one `TableSink` are
//! serialized by an internal lock, so sessions sharing a sink (e.g. behind
//! an `Arc`) cannot overwrite each other. Separate processes writing to the
//! same worksheet can still lose updates; route them through a single
//! writer.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

use crate::domain::responses::ResponseRow;
use crate::ports::{RemoteTable, ResponseSink, SinkError};

/// Worksheet-backed sink.
#[derive(Debug)]
pub struct TableSink<T> {
    table: T,
    worksheet: String,
    writer: Mutex<()>,
}

impl<T: RemoteTable> TableSink<T> {
    pub fn new(table: T, worksheet: impl Into<String>) -> Self {
        Self {
            table,
            worksheet: worksheet.into(),
            writer: Mutex::new(()),
        }
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    /// Parses every data row of the worksheet.
    pub async fn read_rows(&self) -> Result<Vec<ResponseRow>, SinkError> {
        let sheet = self.table.read_all(&self.worksheet).await?;
        sheet
            .iter()
            .skip(1)
            .map(|cells| ResponseRow::from_cells(cells).map_err(SinkError::from))
            .collect()
    }

    fn check_header(&self, header: &[String]) -> Result<(), SinkError> {
        let matches = header.len() == ResponseRow::COLUMNS.len()
            && header
                .iter()
                .zip(ResponseRow::COLUMNS)
                .all(|(actual, expected)| actual == expected);
        if matches {
            Ok(())
        } else {
            Err(SinkError::Serialization(format!(
                "worksheet '{}' has an unexpected header",
                self.worksheet
            )))
        }
    }
}

/// `(session_id, position)` cells of a data row.
fn slot_of(cells: &[String]) -> Option<(String, String)> {
    Some((cells.get(1)?.clone(), cells.get(2)?.clone()))
}

#[async_trait]
impl<T: RemoteTable> ResponseSink for TableSink<T> {
    fn name(&self) -> &str {
        "remote-table"
    }

    async fn append(&self, rows: &[ResponseRow]) -> Result<(), SinkError> {
        if rows.is_empty() {
            return Ok(());
        }
        let _guard = self.writer.lock().await;

        let mut sheet = self.table.read_all(&self.worksheet).await?;
        if sheet.is_empty() {
            sheet.push(ResponseRow::COLUMNS.iter().map(|c| c.to_string()).collect());
        } else {
            self.check_header(&sheet[0])?;
        }

        let mut known: HashSet<String> = sheet
            .iter()
            .skip(1)
            .filter_map(|cells| cells.first().cloned())
            .collect();
        let mut slots: HashMap<(String, String), usize> = sheet
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(index, cells)| slot_of(cells).map(|slot| (slot, index)))
            .collect();

        let (mut added, mut replaced) = (0, 0);
        for row in rows {
            let cells = row.to_cells();
            if !known.insert(cells[0].clone()) {
                continue;
            }
            let slot = slot_of(&cells);
            match slot.as_ref().and_then(|slot| slots.get(slot)) {
                Some(&index) => {
                    sheet[index] = cells;
                    replaced += 1;
                }
                None => {
                    if let Some(slot) = slot {
                        slots.insert(slot, sheet.len());
                    }
                    sheet.push(cells);
                    added += 1;
                }
            }
        }

        if added + replaced == 0 {
            tracing::debug!(worksheet = %self.worksheet, "All rows already present");
            return Ok(());
        }

        self.table.write_all(&self.worksheet, sheet).await?;
        tracing::debug!(
            worksheet = %self.worksheet,
            added,
            replaced,
            skipped = rows.len() - added - replaced,
            "Merged rows into worksheet"
        );
        Ok(())
    }
}
