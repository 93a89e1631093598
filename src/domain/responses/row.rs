//! Tabular schema every sink and export shares.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ExportError;
use crate::domain::catalog::{Adjective, Item};
use crate::domain::foundation::{DecisionId, SessionId, Timestamp, ValidationError};
use crate::domain::survey::{Decision, Locale, ParticipantRole, Side};

/// One persisted decision.
///
/// Field order is column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRow {
    pub decision_id: DecisionId,
    pub session_id: SessionId,
    pub position: usize,
    pub left_image: String,
    pub left_group: Option<String>,
    pub right_image: String,
    pub right_group: Option<String>,
    pub winner: Side,
    pub category: Adjective,
    pub timestamp: Timestamp,
    pub user_type: ParticipantRole,
    pub language: Option<Locale>,
}

impl ResponseRow {
    /// Header row, in column order.
    pub const COLUMNS: [&'static str; 12] = [
        "decision_id",
        "session_id",
        "position",
        "left_image",
        "left_group",
        "right_image",
        "right_group",
        "winner",
        "category",
        "timestamp",
        "user_type",
        "language",
    ];

    /// Renders the row as plain cells for grid-shaped stores.
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.decision_id.to_string(),
            self.session_id.to_string(),
            self.position.to_string(),
            self.left_image.clone(),
            self.left_group.clone().unwrap_or_default(),
            self.right_image.clone(),
            self.right_group.clone().unwrap_or_default(),
            self.winner.to_string(),
            self.category.to_string(),
            self.timestamp.to_rfc3339(),
            self.user_type.to_string(),
            self.language
                .as_ref()
                .map(|l| l.to_string())
                .unwrap_or_default(),
        ]
    }

    /// Session and log position this row answers.
    pub fn slot(&self) -> (SessionId, usize) {
        (self.session_id, self.position)
    }

    /// Parses cells laid out as [`COLUMNS`](Self::COLUMNS).
    pub fn from_cells(cells: &[String]) -> Result<Self, ExportError> {
        let headers = csv::StringRecord::from(Self::COLUMNS.to_vec());
        let record = csv::StringRecord::from(cells.to_vec());
        record
            .deserialize(Some(&headers))
            .map_err(|e| ExportError::InvalidRow {
                line: None,
                reason: e.to_string(),
            })
    }
}

/// Drops rows superseded by a later row for the same session and position.
///
/// Per-decision sinks append every vote as it is cast, so a vote that was
/// undone and re-decided leaves two rows for one slot. The row with the later
/// timestamp wins (file order breaks ties) and takes the slot of the row it
/// replaces, so the result follows each session's log.
pub fn latest_per_position(rows: Vec<ResponseRow>) -> Vec<ResponseRow> {
    let mut slots: HashMap<(SessionId, usize), usize> = HashMap::new();
    let mut kept: Vec<ResponseRow> = Vec::with_capacity(rows.len());
    for row in rows {
        match slots.get(&row.slot()) {
            Some(&index) => {
                if row.timestamp >= kept[index].timestamp {
                    kept[index] = row;
                }
            }
            None => {
                slots.insert(row.slot(), kept.len());
                kept.push(row);
            }
        }
    }
    kept
}

impl From<&Decision> for ResponseRow {
    fn from(decision: &Decision) -> Self {
        Self {
            decision_id: decision.id,
            session_id: decision.session_id,
            position: decision.position,
            left_image: decision.left.id().to_string(),
            left_group: decision.left.group().map(str::to_string),
            right_image: decision.right.id().to_string(),
            right_group: decision.right.group().map(str::to_string),
            winner: decision.chosen,
            category: decision.adjective,
            timestamp: decision.decided_at,
            user_type: decision.role,
            language: decision.language.clone(),
        }
    }
}

impl TryFrom<ResponseRow> for Decision {
    type Error = ValidationError;

    fn try_from(row: ResponseRow) -> Result<Self, Self::Error> {
        let mut left = Item::new(row.left_image)?;
        if let Some(group) = row.left_group {
            left = left.with_group(group);
        }
        let mut right = Item::new(row.right_image)?;
        if let Some(group) = row.right_group {
            right = right.with_group(group);
        }
        if left == right {
            return Err(ValidationError::invalid_format(
                "right_image",
                "left and right images must differ",
            ));
        }
        Ok(Decision {
            id: row.decision_id,
            session_id: row.session_id,
            left,
            right,
            chosen: row.winner,
            adjective: row.category,
            position: row.position,
            decided_at: row.timestamp,
            role: row.user_type,
            language: row.language,
        })
    }
}
