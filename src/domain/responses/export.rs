//! CSV rendering and parsing of the decision log.
//!
//! The same rendering backs the local results file and the downloadable
//! export offered when a sink is unreachable.

use serde::Serialize;
use std::io;

use super::{ExportError, ResponseRow};
use crate::domain::survey::Decision;

/// A downloadable copy of a decision log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
    pub rows: usize,
}

impl ExportArtifact {
    pub const CONTENT_TYPE: &'static str = "text/csv";

    /// Renders `decisions` in log order.
    pub fn from_decisions(
        file_name: impl Into<String>,
        decisions: &[Decision],
    ) -> Result<Self, ExportError> {
        let rows: Vec<ResponseRow> = decisions.iter().map(ResponseRow::from).collect();
        Ok(Self {
            file_name: file_name.into(),
            content_type: Self::CONTENT_TYPE,
            body: render_csv(&rows, true)?,
            rows: rows.len(),
        })
    }

    /// Parses the body back into decisions.
    pub fn decisions(&self) -> Result<Vec<Decision>, ExportError> {
        parse_export(&self.body)
    }
}

/// Renders rows as CSV text, optionally preceded by the header row.
pub fn render_csv(rows: &[ResponseRow], include_header: bool) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    if include_header {
        writer.write_record(ResponseRow::COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Csv(e.to_string()))
}

/// Reads header-prefixed CSV rows.
pub fn read_rows<R: io::Read>(reader: R) -> Result<Vec<ResponseRow>, ExportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<ResponseRow>().enumerate() {
        let row = result.map_err(|e| ExportError::InvalidRow {
            // header is line 1
            line: Some(index + 2),
            reason: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Recovers the ordered decision log from exported CSV text.
pub fn parse_export(body: &str) -> Result<Vec<Decision>, ExportError> {
    read_rows(body.as_bytes())?
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            Decision::try_from(row).map_err(|e| ExportError::InvalidRow {
                line: Some(index + 2),
                reason: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Adjective, Item};
    use crate::domain::foundation::{DecisionId, SessionId, Timestamp};
    use crate::domain::survey::{Locale, ParticipantRole, Side};

    fn decision(left: &str, right: &str, chosen: Side, adjective: Adjective) -> Decision {
        Decision {
            id: DecisionId::new(),
            session_id: SessionId::new(),
            left: Item::new(left).unwrap(),
            right: Item::new(right).unwrap(),
            chosen,
            adjective,
            position: 0,
            decided_at: Timestamp::now(),
            role: ParticipantRole::Tourist,
            language: None,
        }
    }

    #[test]
    fn export_round_trips_log_in_order() {
        let log = vec![
            decision("a.jpg", "b.jpg", Side::Left, Adjective::Safe),
            decision("c.jpg", "a.jpg", Side::Right, Adjective::Lively),
            Decision {
                language: Some(Locale::new("it").unwrap()),
                left: Item::new("b.jpg").unwrap().with_group("centro"),
                ..decision("b.jpg", "c.jpg", Side::Left, Adjective::Boring)
            },
        ];

        let artifact = ExportArtifact::from_decisions("responses.csv", &log).unwrap();
        assert_eq!(artifact.rows, 3);
        assert_eq!(artifact.content_type, "text/csv");
        assert_eq!(artifact.decisions().unwrap(), log);
    }

    #[test]
    fn empty_export_still_has_header() {
        let artifact = ExportArtifact::from_decisions("empty.csv", &[]).unwrap();
        assert_eq!(artifact.body.trim_end(), ResponseRow::COLUMNS.join(","));
        assert!(artifact.decisions().unwrap().is_empty());
    }

    #[test]
    fn names_with_commas_are_quoted() {
        let log = vec![decision("via roma, 3.jpg", "b.jpg", Side::Left, Adjective::Safe)];
        let artifact = ExportArtifact::from_decisions("x.csv", &log).unwrap();
        assert!(artifact.body.contains("\"via roma, 3.jpg\""));
        assert_eq!(artifact.decisions().unwrap(), log);
    }

    #[test]
    fn render_without_header_appends_cleanly() {
        let first = vec![ResponseRow::from(&decision("a", "b", Side::Left, Adjective::Safe))];
        let second = vec![ResponseRow::from(&decision("b", "c", Side::Right, Adjective::Safe))];
        let body = format!(
            "{}{}",
            render_csv(&first, true).unwrap(),
            render_csv(&second, false).unwrap()
        );
        let rows = read_rows(body.as_bytes()).unwrap();
        assert_eq!(rows, [first, second].concat());
    }

    #[test]
    fn parse_reports_line_of_bad_row() {
        let good = ResponseRow::from(&decision("a", "b", Side::Left, Adjective::Safe));
        let mut body = render_csv(&[good], true).unwrap();
        body.push_str("garbage,row\n");
        match parse_export(&body) {
            Err(ExportError::InvalidRow { line, .. }) => assert_eq!(line, Some(3)),
            other => panic!("expected InvalidRow, got {:?}", other),
        }
    }
}
