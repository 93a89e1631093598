//! Integration tests for a full survey session.
//!
//! These tests drive the public API end to end:
//! 1. Load a catalog from an image directory
//! 2. Onboard, vote, undo and skip through a session until it completes
//! 3. Deliver the decision log to a sink, with and without sink failures
//! 4. Read the stored rows or the downloadable export back
//!
//! Uses in-memory sinks and temporary directories; no external services.

use std::sync::Arc;

use perception_survey::adapters::{CsvFileSink, DirectoryItemSource, InMemorySink, InMemoryTable, TableSink};
use perception_survey::application::{
    CastVoteCommand, CastVoteHandler, FinishSurveyHandler, PersistenceMode, ResponseStore,
    SyncStatus,
};
use perception_survey::domain::catalog::{Adjective, Item, ItemCatalog};
use perception_survey::domain::foundation::SurveyPhase;
use perception_survey::domain::responses::{latest_per_position, parse_export};
use perception_survey::domain::survey::{
    AdjectivePool, BalancePolicy, Locale, ParticipantRole, Side, SurveySession, SurveySettings,
    TrialSequencer,
};
use perception_survey::ports::{ItemSource, ResponseSink};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn catalog() -> ItemCatalog {
    ItemCatalog::new(["A", "B", "C"].iter().map(|id| Item::new(*id).unwrap()))
}

fn settings(target_count: usize) -> SurveySettings {
    SurveySettings {
        target_count,
        adjectives: vec![Adjective::Safe, Adjective::Lively],
        balance: BalancePolicy::Strict,
        require_consent: false,
    }
}

/// Session in `Voting` with the adjective order `[Lively, Safe, Safe, Lively]`.
fn voting_session() -> SurveySession {
    let mut session = SurveySession::new(settings(4)).unwrap();
    session
        .begin_with_pool(
            ParticipantRole::Resident,
            Some(Locale::new("en").unwrap()),
            AdjectivePool::from_order(vec![
                Adjective::Lively,
                Adjective::Safe,
                Adjective::Safe,
                Adjective::Lively,
            ]),
        )
        .unwrap();
    session
}

struct Harness {
    session: SurveySession,
    seq: TrialSequencer,
    catalog: ItemCatalog,
    cast_vote: CastVoteHandler,
    finish: FinishSurveyHandler,
}

impl Harness {
    fn new(sink: Arc<dyn ResponseSink>, mode: PersistenceMode) -> Self {
        Self::with_store(Arc::new(ResponseStore::new(sink)), mode)
    }

    fn with_store(store: Arc<ResponseStore>, mode: PersistenceMode) -> Self {
        Self {
            session: voting_session(),
            seq: TrialSequencer::seeded(2024),
            catalog: catalog(),
            cast_vote: CastVoteHandler::new(Arc::clone(&store), mode),
            finish: FinishSurveyHandler::new(store),
        }
    }

    async fn vote(&mut self, chosen: Side) -> SyncStatus {
        self.session
            .current_trial(&mut self.seq, &self.catalog)
            .unwrap();
        self.cast_vote
            .handle(&mut self.session, &self.seq, CastVoteCommand { chosen })
            .await
            .unwrap()
            .sync
    }

    async fn vote_to_completion(&mut self) {
        while !self.session.is_completed() {
            self.vote(Side::Left).await;
        }
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

/// Vote, take back, re-decide, complete, and flush in log order.
#[tokio::test]
async fn undo_and_redecide_then_flush_in_order() {
    let sink = InMemorySink::new();
    let mut h = Harness::new(Arc::new(sink.clone()), PersistenceMode::EndOfSession);

    h.vote(Side::Left).await;
    h.vote(Side::Right).await;
    let second = h.session.decisions()[1].trial();

    // Take back the second decision: the exact pair comes back on screen
    let restored = h.session.undo(&h.seq).unwrap().clone();
    assert_eq!(restored, second);
    assert_eq!(h.session.consumed_count(), 1);

    h.vote(Side::Left).await;
    h.vote(Side::Left).await;
    let last = h.vote(Side::Right).await;

    assert_eq!(h.session.phase(), SurveyPhase::Completed);
    assert_eq!(last, SyncStatus::Synced);

    let rows = sink.rows().await;
    assert_eq!(rows.len(), 4);
    let categories: Vec<_> = rows.iter().map(|r| r.category).collect();
    assert_eq!(
        categories,
        vec![Adjective::Lively, Adjective::Safe, Adjective::Safe, Adjective::Lively]
    );
    let logged: Vec<_> = h.session.decisions().iter().map(|d| d.id).collect();
    let stored: Vec<_> = rows.iter().map(|r| r.decision_id).collect();
    assert_eq!(stored, logged);
    assert!(rows.iter().all(|r| r.left_image != r.right_image));
    assert!(rows.iter().all(|r| r.language.as_ref().map(Locale::as_str) == Some("en")));
}

/// Undo while the next pair is showing discards that pair and brings back
/// the decided one.
#[tokio::test]
async fn undo_with_pending_trial_restores_previous_pair() {
    let sink = InMemorySink::new();
    let mut h = Harness::new(Arc::new(sink.clone()), PersistenceMode::EndOfSession);

    let first = h
        .session
        .current_trial(&mut h.seq, &h.catalog)
        .unwrap()
        .clone();
    assert_eq!(first.adjective(), Adjective::Lively);
    h.vote(Side::Left).await;

    h.session.current_trial(&mut h.seq, &h.catalog).unwrap();
    let restored = h.session.undo(&h.seq).unwrap().clone();
    assert_eq!(restored, first);
    assert_eq!(h.session.consumed_count(), 0);
    assert!(h.session.decisions().is_empty());

    h.vote(Side::Right).await;
    assert_eq!(h.session.decisions()[0].trial(), first);
    assert_eq!(h.session.decisions()[0].chosen, Side::Right);

    h.vote_to_completion().await;
    assert_eq!(h.session.phase(), SurveyPhase::Completed);
    let stored: Vec<_> = sink.rows().await.iter().map(|r| r.decision_id).collect();
    let logged: Vec<_> = h.session.decisions().iter().map(|d| d.id).collect();
    assert_eq!(stored, logged);
}

/// In per-decision mode an undone vote is already stored. The re-decided vote
/// for the same position supersedes it.
#[tokio::test]
async fn per_decision_undo_is_superseded_by_redecided_row() {
    let sink = InMemorySink::new();
    let mut h = Harness::new(Arc::new(sink.clone()), PersistenceMode::PerDecision);

    h.vote(Side::Left).await;
    let undone = h.session.decisions()[0].id;
    h.session.current_trial(&mut h.seq, &h.catalog).unwrap();
    h.session.undo(&h.seq).unwrap();
    h.vote_to_completion().await;
    assert_eq!(h.session.decisions().len(), 4);

    let rows = sink.rows().await;
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().any(|r| r.decision_id == undone));

    let kept = latest_per_position(rows);
    let kept_ids: Vec<_> = kept.iter().map(|r| r.decision_id).collect();
    let logged: Vec<_> = h.session.decisions().iter().map(|d| d.id).collect();
    assert_eq!(kept_ids, logged);
    let positions: Vec<_> = kept.iter().map(|r| r.position).collect();
    assert_eq!(positions, vec![0, 1, 2, 3]);
}

/// A worksheet sink replaces the undone row, so the sheet matches the log.
#[tokio::test]
async fn per_decision_undo_leaves_one_worksheet_row_per_position() {
    let table = InMemoryTable::new();
    let sink = Arc::new(TableSink::new(table.clone(), "responses"));
    let mut h = Harness::new(sink.clone(), PersistenceMode::PerDecision);

    h.vote(Side::Left).await;
    h.vote(Side::Left).await;
    let undone = h.session.decisions()[1].id;
    h.session.undo(&h.seq).unwrap();
    h.vote_to_completion().await;

    let stored: Vec<_> = sink
        .read_rows()
        .await
        .unwrap()
        .iter()
        .map(|r| r.decision_id)
        .collect();
    let logged: Vec<_> = h.session.decisions().iter().map(|d| d.id).collect();
    assert_eq!(stored, logged);
    assert!(!stored.contains(&undone));
    assert_eq!(table.sheet("responses").await.len(), 5);
}

/// Skipped pairs never reach the log or the sink.
#[tokio::test]
async fn skipped_pairs_are_not_recorded() {
    let sink = InMemorySink::new();
    let mut h = Harness::new(Arc::new(sink.clone()), PersistenceMode::PerDecision);

    h.vote(Side::Left).await;
    h.session.current_trial(&mut h.seq, &h.catalog).unwrap();
    h.session.skip(&h.seq).unwrap();
    assert_eq!(h.session.consumed_count(), 1);

    h.vote_to_completion().await;
    assert_eq!(sink.row_count().await, 4);
}

/// A failing sink degrades the session but the export holds every decision,
/// and a retry after a partial write adds only the missing rows.
#[tokio::test]
async fn failed_flush_exports_log_and_retry_does_not_duplicate() {
    let sink = InMemorySink::new();
    sink.fail_after(1).await;
    let mut h = Harness::new(Arc::new(sink.clone()), PersistenceMode::EndOfSession);

    for _ in 0..3 {
        h.vote(Side::Left).await;
    }
    let last = h.vote(Side::Right).await;

    let export = match last {
        SyncStatus::Degraded { export, .. } => export.expect("export offered"),
        other => panic!("expected degraded status, got {other:?}"),
    };
    assert_eq!(export.rows, 4);
    assert_eq!(export.content_type, "text/csv");
    assert_eq!(parse_export(&export.body).unwrap(), h.session.decisions());
    assert_eq!(sink.row_count().await, 1);

    let report = h.finish.handle(&h.session).await.unwrap();
    assert_eq!(report.sync, SyncStatus::Synced);
    assert_eq!(report.rows, 4);

    let stored: Vec<_> = sink.rows().await.iter().map(|r| r.decision_id).collect();
    let logged: Vec<_> = h.session.decisions().iter().map(|d| d.id).collect();
    assert_eq!(stored, logged);
}

/// Per-role CSV files hold the rows of each participant role.
#[tokio::test]
async fn csv_results_are_partitioned_by_role() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(CsvFileSink::per_role(dir.path()));
    let mut h = Harness::new(sink.clone(), PersistenceMode::PerDecision);

    h.vote_to_completion().await;

    let resident = std::fs::read_to_string(dir.path().join("results_resident.csv")).unwrap();
    assert!(resident.starts_with("decision_id,session_id,position,left_image"));
    assert_eq!(resident.lines().count(), 5);
    assert!(!dir.path().join("results_tourist.csv").exists());

    let rows = sink.read_all().await.unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.user_type == ParticipantRole::Resident));
}

/// A results file with another column layout is left untouched and votes go
/// to the fallback file instead.
#[tokio::test]
async fn foreign_results_file_sends_votes_to_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let results = dir.path().join("results_resident.csv");
    let foreign = "left_image,right_image,winner,category,timestamp\n";
    std::fs::write(&results, foreign).unwrap();

    let fallback = Arc::new(CsvFileSink::new(dir.path().join("fallback.csv")));
    let store = ResponseStore::new(Arc::new(CsvFileSink::per_role(dir.path())))
        .with_fallback(fallback.clone());
    let mut h = Harness::with_store(Arc::new(store), PersistenceMode::PerDecision);

    let status = h.vote(Side::Left).await;

    assert_eq!(status, SyncStatus::Pending);
    assert_eq!(std::fs::read_to_string(&results).unwrap(), foreign);
    let saved = fallback.read_all().await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].decision_id, h.session.decisions()[0].id);
}

/// Two sessions sharing a worksheet sink both land in the sheet.
#[tokio::test]
async fn sessions_share_remote_worksheet() {
    let table = InMemoryTable::new();
    let sink = Arc::new(TableSink::new(table.clone(), "responses"));

    let mut first = Harness::new(sink.clone(), PersistenceMode::EndOfSession);
    let mut second = Harness::new(sink.clone(), PersistenceMode::EndOfSession);
    first.vote_to_completion().await;
    second.vote_to_completion().await;

    let rows = sink.read_rows().await.unwrap();
    assert_eq!(rows.len(), 8);
    assert_eq!(table.sheet("responses").await.len(), 9);
}

/// Items loaded from disk drive a full session after a reset.
#[tokio::test]
async fn directory_catalog_session_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.jpg", "b.png", "c.jpeg", "notes.txt"] {
        std::fs::write(dir.path().join(name), b"x").unwrap();
    }
    let catalog = DirectoryItemSource::new(dir.path()).load(None).await.unwrap();
    assert_eq!(catalog.len(), 3);

    let sink = InMemorySink::new();
    let mut h = Harness::new(Arc::new(sink.clone()), PersistenceMode::PerDecision);
    h.catalog = catalog;
    h.vote_to_completion().await;
    let first_session = *h.session.id();

    h.session.reset();
    assert_eq!(h.session.phase(), SurveyPhase::Onboarding);
    assert_ne!(*h.session.id(), first_session);
    assert!(h.session.decisions().is_empty());

    let mut seq = TrialSequencer::seeded(5);
    h.session
        .begin(ParticipantRole::Tourist, None, &mut seq)
        .unwrap();
    assert_eq!(h.session.role(), Some(ParticipantRole::Tourist));
    assert_eq!(sink.row_count().await, 4);
}
