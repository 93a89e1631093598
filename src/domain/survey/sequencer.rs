//! Trial sequencer: draws trials and navigates backwards through decisions.
//!
//! The sequencer owns only its random source. Progress (the decision log and
//! the consumed count) lives in the caller's session and is passed in.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{AdjectivePool, BalancePolicy, Decision, Respondent, Side, SurveyError, Trial};
use crate::domain::catalog::{Adjective, ItemCatalog};
use crate::domain::foundation::{DecisionId, Timestamp, ValidationError};

/// Produces the trial stream for one session.
#[derive(Debug, Clone)]
pub struct TrialSequencer<R = StdRng> {
    rng: R,
}

impl TrialSequencer<StdRng> {
    /// Sequencer seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible sequencer for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> TrialSequencer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Shuffles the adjective multiset for a session of `target_count` trials.
    pub fn adjective_pool(
        &mut self,
        adjectives: &[Adjective],
        target_count: usize,
        policy: BalancePolicy,
    ) -> Result<AdjectivePool, ValidationError> {
        AdjectivePool::balanced(adjectives, target_count, policy, &mut self.rng)
    }

    /// Draws the next trial.
    ///
    /// The pair is a uniformly random 2-combination of `items` and the
    /// placement drawn here is the placement shown. The adjective is the
    /// pool entry at `consumed_count`.
    ///
    /// # Errors
    ///
    /// - `InsufficientItems` if `items` holds fewer than two entries
    /// - `PoolExhausted` if `consumed_count >= pool.len()`
    pub fn next_trial(
        &mut self,
        items: &ItemCatalog,
        pool: &AdjectivePool,
        consumed_count: usize,
    ) -> Result<Trial, SurveyError> {
        let available = items.len();
        if available < 2 {
            return Err(SurveyError::InsufficientItems { available });
        }
        let adjective = pool.at(consumed_count)?;

        let first = self.rng.gen_range(0..available);
        let mut second = self.rng.gen_range(0..available - 1);
        if second >= first {
            second += 1;
        }

        let entries = items.items();
        let trial = Trial::new(
            entries[first].clone(),
            entries[second].clone(),
            adjective,
            consumed_count,
        );
        debug!(
            left = %trial.left(),
            right = %trial.right(),
            adjective = %adjective,
            position = consumed_count,
            "Drew trial"
        );
        Ok(trial)
    }

    /// Resolves `trial` into a decision stamped with the current time.
    ///
    /// Does not touch sequencer state; the caller appends the decision.
    pub fn record_decision(&self, trial: &Trial, chosen: Side, respondent: &Respondent) -> Decision {
        Decision {
            id: DecisionId::new(),
            session_id: respondent.session_id,
            left: trial.left().clone(),
            right: trial.right().clone(),
            chosen,
            adjective: trial.adjective(),
            position: trial.position(),
            decided_at: Timestamp::now(),
            role: respondent.role,
            language: respondent.language.clone(),
        }
    }

    /// Removes the latest decision and returns the trial it resolved.
    ///
    /// # Errors
    ///
    /// - `EmptyLog` if there is nothing to undo
    pub fn undo(&self, log: &mut Vec<Decision>) -> Result<Trial, SurveyError> {
        let decision = log.pop().ok_or(SurveyError::EmptyLog)?;
        debug!(decision_id = %decision.id, "Undid decision");
        Ok(decision.trial())
    }

    /// Discards `current` without recording anything.
    pub fn skip(&self, current: Trial) {
        debug!(
            left = %current.left(),
            right = %current.right(),
            adjective = %current.adjective(),
            "Skipped trial"
        );
    }
}
