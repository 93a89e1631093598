//! Survey-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, SurveyPhase, ValidationError};

/// Errors raised by the trial sequencer and the session state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveyError {
    /// Fewer than two items available to form a pair.
    #[error("Need at least 2 items to draw a trial, found {available}")]
    InsufficientItems { available: usize },

    /// Requested an adjective past the end of the pre-shuffled pool.
    #[error("Adjective pool exhausted: position {position} of {len}")]
    PoolExhausted { position: usize, len: usize },

    /// Undo requested with no recorded decision.
    #[error("No decision to undo")]
    EmptyLog,

    /// A command that resolves the current trial arrived with none pending.
    #[error("No trial is pending")]
    NoTrialPending,

    /// Voting started before the onboarding consent gate was acknowledged.
    #[error("Consent must be acknowledged before voting starts")]
    ConsentRequired,

    /// Command not valid in the session's current phase.
    #[error("Cannot {action} while session is {phase}")]
    InvalidState {
        action: &'static str,
        phase: SurveyPhase,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl SurveyError {
    pub fn invalid_state(action: &'static str, phase: SurveyPhase) -> Self {
        SurveyError::InvalidState { action, phase }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SurveyError::InsufficientItems { .. } => ErrorCode::InsufficientItems,
            SurveyError::PoolExhausted { .. } => ErrorCode::PoolExhausted,
            SurveyError::EmptyLog => ErrorCode::EmptyLog,
            SurveyError::NoTrialPending => ErrorCode::NoTrialPending,
            SurveyError::ConsentRequired => ErrorCode::ConsentRequired,
            SurveyError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            SurveyError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }
}

impl From<SurveyError> for DomainError {
    fn from(err: SurveyError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
