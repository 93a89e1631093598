//! FinishSurveyHandler - Delivers a completed session's decision log.

use std::sync::Arc;

use crate::application::{ResponseStore, SyncStatus};
use crate::domain::foundation::SurveyPhase;
use crate::domain::survey::{ParticipantRole, SurveyError, SurveySession};

/// Summary shown on the completion screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    pub role: ParticipantRole,
    pub rows: usize,
    pub sync: SyncStatus,
}

/// Handler for completing a survey.
///
/// Safe to call again after a failed delivery; only rows the sink does not
/// hold yet are sent.
pub struct FinishSurveyHandler {
    store: Arc<ResponseStore>,
}

impl FinishSurveyHandler {
    pub fn new(store: Arc<ResponseStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, session: &SurveySession) -> Result<CompletionReport, SurveyError> {
        if session.phase() != SurveyPhase::Completed {
            return Err(SurveyError::invalid_state("finish the survey", session.phase()));
        }
        let role = session
            .role()
            .ok_or(SurveyError::invalid_state("finish the survey", session.phase()))?;

        let decisions = session.decisions();
        let sync = SyncStatus::from_flush(self.store.flush(decisions).await);

        Ok(CompletionReport {
            role,
            rows: decisions.len(),
            sync,
        })
    }
}
