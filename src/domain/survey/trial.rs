//! Trials (questions shown) and Decisions (answers recorded).

use serde::{Deserialize, Serialize};

use super::{Locale, ParticipantRole, Side};
use crate::domain::catalog::{Adjective, Item};
use crate::domain::foundation::{DecisionId, SessionId, Timestamp};

/// One paired-comparison question.
///
/// The left/right placement is fixed when the trial is drawn and never
/// swapped afterwards. `position` is the 0-based slot in the session the
/// trial fills, so a re-drawn or restored trial keeps the slot it had.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trial {
    left: Item,
    right: Item,
    adjective: Adjective,
    position: usize,
}

impl Trial {
    pub(crate) fn new(left: Item, right: Item, adjective: Adjective, position: usize) -> Self {
        debug_assert_ne!(left, right, "a trial pairs two distinct items");
        Self {
            left,
            right,
            adjective,
            position,
        }
    }

    pub fn left(&self) -> &Item {
        &self.left
    }

    pub fn right(&self) -> &Item {
        &self.right
    }

    /// Both items in `(left, right)` order.
    pub fn items(&self) -> (&Item, &Item) {
        (&self.left, &self.right)
    }

    pub fn item(&self, side: Side) -> &Item {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn adjective(&self) -> Adjective {
        self.adjective
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn prompt(&self) -> String {
        self.adjective.prompt()
    }
}

/// Who is answering: stamped onto every decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Respondent {
    pub session_id: SessionId,
    pub role: ParticipantRole,
    pub language: Option<Locale>,
}

/// Immutable record of a resolved trial.
///
/// `position` is the log index the decision was appended at. A decision that
/// is undone and re-decided leaves two stored rows with the same session and
/// position in append-only sinks; the later one supersedes the earlier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub id: DecisionId,
    pub session_id: SessionId,
    pub left: Item,
    pub right: Item,
    pub chosen: Side,
    pub adjective: Adjective,
    pub position: usize,
    pub decided_at: Timestamp,
    pub role: ParticipantRole,
    pub language: Option<Locale>,
}

impl Decision {
    /// Rebuilds the trial this decision resolved, with the same placement.
    pub fn trial(&self) -> Trial {
        Trial {
            left: self.left.clone(),
            right: self.right.clone(),
            adjective: self.adjective,
            position: self.position,
        }
    }

    /// The item the participant picked.
    pub fn winner(&self) -> &Item {
        match self.chosen {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}
