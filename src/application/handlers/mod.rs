//! Application handlers.
//!
//! Command handlers that drive the survey aggregate and deliver its log.

mod cast_vote;
mod finish_survey;

pub use cast_vote::{CastVoteCommand, CastVoteHandler, CastVoteResult};
pub use finish_survey::{CompletionReport, FinishSurveyHandler};
