//! Survey domain module.
//!
//! The paired-comparison loop: the [`TrialSequencer`] draws trials, the
//! [`SurveySession`] aggregate drives the `Onboarding → Voting → Completed`
//! state machine and holds the ordered decision log.
//!
//! # Commands
//!
//! - `begin` - leave onboarding with a role and optional language
//! - `advance` - record a left/right choice for the pending trial
//! - `undo` - take back the latest decision and re-show its trial
//! - `skip` - discard the pending trial without recording it
//! - `reset` - clear all state and return to onboarding

mod adjective_pool;
mod aggregate;
mod errors;
mod sequencer;
mod trial;
mod values;

pub use adjective_pool::{AdjectivePool, BalancePolicy};
pub use aggregate::{Progress, SurveySession, SurveySettings};
pub use errors::SurveyError;
pub use sequencer::TrialSequencer;
pub use trial::{Decision, Respondent, Trial};
pub use values::{Locale, ParticipantRole, Side};
