//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the survey domain.

mod errors;
mod ids;
mod state_machine;
mod survey_phase;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{DecisionId, SessionId};
pub use state_machine::StateMachine;
pub use survey_phase::SurveyPhase;
pub use timestamp::Timestamp;
