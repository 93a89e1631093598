//! SurveyPhase enum tracking the lifecycle of a participant session.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle phase of a survey session.
///
/// ```text
/// Onboarding --begin--> Voting --target reached--> Completed
///      ^                  |                            |
///      +------reset-------+------------reset-----------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SurveyPhase {
    #[default]
    Onboarding,
    Voting,
    Completed,
}

impl SurveyPhase {
    /// Returns true while decisions may still be recorded.
    pub fn accepts_votes(&self) -> bool {
        matches!(self, SurveyPhase::Voting)
    }
}

impl StateMachine for SurveyPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SurveyPhase::*;
        matches!(
            (self, target),
            (Onboarding, Voting) | (Voting, Completed) | (Voting, Onboarding) | (Completed, Onboarding)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SurveyPhase::*;
        match self {
            Onboarding => vec![Voting],
            Voting => vec![Completed, Onboarding],
            Completed => vec![Onboarding],
        }
    }
}

impl fmt::Display for SurveyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SurveyPhase::Onboarding => "Onboarding",
            SurveyPhase::Voting => "Voting",
            SurveyPhase::Completed => "Completed",
        };
        write!(f, "{}", s)
    }
}
