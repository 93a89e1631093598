//! CSV File Sink Adapter
//!
//! Appends response rows to local CSV files. Files are never rewritten:
//! the header goes in when a file is created (or found empty) and every
//! later batch is appended below it. A non-empty file whose header is not
//! [`ResponseRow::COLUMNS`] is left alone and the append fails.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use crate::domain::responses::{read_rows, render_csv, ResponseRow};
use crate::domain::survey::ParticipantRole;
use crate::ports::{ResponseSink, SinkError};

/// Where rows land on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Layout {
    /// Every row in one file.
    Single(PathBuf),
    /// One `results_<role>.csv` per participant role inside a directory.
    PerRole(PathBuf),
}

/// Append-only CSV storage.
#[derive(Debug)]
pub struct CsvFileSink {
    layout: Layout,
    write_lock: Mutex<()>,
}

impl CsvFileSink {
    /// Sink writing every row to `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            layout: Layout::Single(path.as_ref().to_path_buf()),
            write_lock: Mutex::new(()),
        }
    }

    /// Sink writing `results_resident.csv` / `results_tourist.csv` under `dir`.
    pub fn per_role<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            layout: Layout::PerRole(dir.as_ref().to_path_buf()),
            write_lock: Mutex::new(()),
        }
    }

    /// File a row from `role` is appended to.
    pub fn path_for(&self, role: ParticipantRole) -> PathBuf {
        match &self.layout {
            Layout::Single(path) => path.clone(),
            Layout::PerRole(dir) => {
                dir.join(format!("results_{}.csv", role.as_str().to_lowercase()))
            }
        }
    }

    /// Reads back every stored row, one file at a time.
    pub async fn read_all(&self) -> Result<Vec<ResponseRow>, SinkError> {
        let paths = match &self.layout {
            Layout::Single(path) => vec![path.clone()],
            Layout::PerRole(_) => vec![
                self.path_for(ParticipantRole::Resident),
                self.path_for(ParticipantRole::Tourist),
            ],
        };

        let mut rows = Vec::new();
        for path in paths {
            if !path.exists() {
                continue;
            }
            let content = fs::read(&path).await?;
            rows.extend(read_rows(content.as_slice())?);
        }
        Ok(rows)
    }

    async fn append_to(&self, path: &Path, rows: &[ResponseRow]) -> Result<(), SinkError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let needs_header = match fs::metadata(path).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => {
                check_header(path).await?;
                false
            }
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };
        let text = render_csv(rows, needs_header)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(text.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Fails unless the first record of `path` is [`ResponseRow::COLUMNS`].
async fn check_header(path: &Path) -> Result<(), SinkError> {
    let file = fs::File::open(path).await?;
    let first_line = BufReader::new(file)
        .lines()
        .next_line()
        .await?
        .unwrap_or_default();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(first_line.as_bytes());
    let header = match reader.records().next() {
        Some(record) => record.map_err(|e| SinkError::Serialization(e.to_string()))?,
        None => csv::StringRecord::new(),
    };

    if header.iter().eq(ResponseRow::COLUMNS.iter().copied()) {
        Ok(())
    } else {
        Err(SinkError::Serialization(format!(
            "{} has an unexpected header",
            path.display()
        )))
    }
}

#[async_trait]
impl ResponseSink for CsvFileSink {
    fn name(&self) -> &str {
        "csv-file"
    }

    async fn append(&self, rows: &[ResponseRow]) -> Result<(), SinkError> {
        if rows.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock().await;

        // consecutive rows sharing a destination are written together so a
        // failure leaves a clean prefix behind
        let mut written = 0;
        while written < rows.len() {
            let path = self.path_for(rows[written].user_type);
            let run_len = rows[written..]
                .iter()
                .take_while(|row| self.path_for(row.user_type) == path)
                .count();
            let run = &rows[written..written + run_len];
            if let Err(err) = self.append_to(&path, run).await {
                return Err(if written == 0 {
                    err
                } else {
                    SinkError::PartialWrite {
                        written,
                        reason: err.to_string(),
                    }
                });
            }
            written += run_len;
        }

        tracing::debug!(rows = rows.len(), "Appended rows to CSV");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Adjective, Item};
    use crate::domain::foundation::{DecisionId, SessionId, Timestamp};
    use crate::domain::survey::{Decision, Side};
    use tempfile::TempDir;

    fn row(role: ParticipantRole, left: &str) -> ResponseRow {
        ResponseRow::from(&Decision {
            id: DecisionId::new(),
            session_id: SessionId::new(),
            left: Item::new(left).unwrap(),
            right: Item::new("z.jpg").unwrap(),
            chosen: Side::Left,
            adjective: Adjective::Safe,
            position: 0,
            decided_at: Timestamp::now(),
            role,
            language: None,
        })
    }

    #[tokio::test]
    async fn header_written_once_across_appends() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.csv");
        let sink = CsvFileSink::new(&path);

        let first = row(ParticipantRole::Resident, "a.jpg");
        let second = row(ParticipantRole::Resident, "b.jpg");
        sink.append(&[first.clone()]).await.unwrap();
        sink.append(&[second.clone()]).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("decision_id").count(), 1);
        assert_eq!(sink.read_all().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn creates_missing_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/deeper/results.csv");
        let sink = CsvFileSink::new(&path);

        sink.append(&[row(ParticipantRole::Tourist, "a.jpg")])
            .await
            .unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn empty_file_gets_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.csv");
        std::fs::write(&path, "").unwrap();
        let sink = CsvFileSink::new(&path);

        let r = row(ParticipantRole::Tourist, "a.jpg");
        sink.append(&[r.clone()]).await.unwrap();
        assert_eq!(sink.read_all().await.unwrap(), vec![r]);
    }

    #[tokio::test]
    async fn file_with_other_columns_is_not_appended_to() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results_resident.csv");
        let legacy = "left_image,right_image,winner,category,timestamp\n\
                      a.jpg,b.jpg,a.jpg,Safe,2024-05-01 10:00:00\n";
        std::fs::write(&path, legacy).unwrap();
        let sink = CsvFileSink::per_role(temp_dir.path());

        let result = sink.append(&[row(ParticipantRole::Resident, "a.jpg")]).await;

        assert!(matches!(result, Err(SinkError::Serialization(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), legacy);
    }

    #[tokio::test]
    async fn file_with_matching_header_is_appended_to() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.csv");
        std::fs::write(&path, format!("{}\n", ResponseRow::COLUMNS.join(","))).unwrap();
        let sink = CsvFileSink::new(&path);

        let r = row(ParticipantRole::Tourist, "a.jpg");
        sink.append(&[r.clone()]).await.unwrap();
        assert_eq!(sink.read_all().await.unwrap(), vec![r]);
    }

    #[tokio::test]
    async fn per_role_layout_splits_files() {
        let temp_dir = TempDir::new().unwrap();
        let sink = CsvFileSink::per_role(temp_dir.path());

        let resident = row(ParticipantRole::Resident, "a.jpg");
        let tourist = row(ParticipantRole::Tourist, "b.jpg");
        sink.append(&[resident.clone(), tourist.clone()])
            .await
            .unwrap();

        assert!(temp_dir.path().join("results_resident.csv").exists());
        assert!(temp_dir.path().join("results_tourist.csv").exists());
        assert_eq!(sink.read_all().await.unwrap(), vec![resident, tourist]);
    }

    #[tokio::test]
    async fn unwritable_path_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        // a directory where the file should be
        let sink = CsvFileSink::new(temp_dir.path());

        let result = sink.append(&[row(ParticipantRole::Resident, "a.jpg")]).await;
        assert!(matches!(result, Err(SinkError::Io(_))));
    }

    #[tokio::test]
    async fn empty_batch_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.csv");
        CsvFileSink::new(&path).append(&[]).await.unwrap();
        assert!(!path.exists());
    }
}
