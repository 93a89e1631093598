//! CastVoteHandler - Command handler for recording a left/right choice.

use rand::Rng;
use std::sync::Arc;
use tracing::debug;

use crate::application::{PersistenceMode, ResponseStore, SyncStatus};
use crate::domain::survey::{Decision, Side, SurveyError, SurveySession, TrialSequencer};

/// Command to resolve the pending trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastVoteCommand {
    pub chosen: Side,
}

/// Result of a recorded vote.
#[derive(Debug, Clone)]
pub struct CastVoteResult {
    pub decision: Decision,
    /// The vote reached the target count.
    pub completed: bool,
    pub sync: SyncStatus,
}

/// Handler for casting votes.
pub struct CastVoteHandler {
    store: Arc<ResponseStore>,
    mode: PersistenceMode,
}

impl CastVoteHandler {
    pub fn new(store: Arc<ResponseStore>, mode: PersistenceMode) -> Self {
        Self { store, mode }
    }

    /// Records the vote, then persists according to the persistence mode.
    ///
    /// Sink failures never fail the vote; they surface in `sync`. A vote
    /// stored here and later undone stays in the sink; its re-decided
    /// replacement shares its `position`.
    pub async fn handle<R: Rng>(
        &self,
        session: &mut SurveySession,
        sequencer: &TrialSequencer<R>,
        cmd: CastVoteCommand,
    ) -> Result<CastVoteResult, SurveyError> {
        let decision = session.advance(cmd.chosen, sequencer)?;
        let completed = session.is_completed();

        let mut sync = SyncStatus::Pending;
        if self.mode == PersistenceMode::PerDecision {
            sync = match self.store.append(&decision).await {
                Ok(()) => SyncStatus::Synced,
                Err(err) => {
                    debug!(decision_id = %decision.id, error = %err, "Decision held for flush");
                    SyncStatus::Pending
                }
            };
        }
        if completed {
            sync = SyncStatus::from_flush(self.store.flush(session.decisions()).await);
        }

        Ok(CastVoteResult {
            decision,
            completed,
            sync,
        })
    }
}
