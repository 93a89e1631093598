//! Survey session aggregate.
//!
//! A session is one participant's pass through the wizard:
//! onboarding, the voting loop and the completion screen. All progress
//! lives here and is handed to the sequencer explicitly.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    AdjectivePool, BalancePolicy, Decision, Locale, ParticipantRole, Respondent, Side,
    SurveyError, Trial, TrialSequencer,
};
use crate::domain::catalog::{Adjective, ItemCatalog};
use crate::domain::foundation::{SessionId, StateMachine, SurveyPhase, Timestamp, ValidationError};

/// Parameters fixed for every session of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySettings {
    /// Number of decisions that completes a session.
    pub target_count: usize,
    /// Adjectives rotated across trials.
    pub adjectives: Vec<Adjective>,
    pub balance: BalancePolicy,
    /// Whether onboarding shows a consent gate that must be acknowledged.
    pub require_consent: bool,
}

impl SurveySettings {
    /// Validates the settings without building a pool.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.target_count == 0 {
            return Err(ValidationError::out_of_range(
                "target_count",
                1,
                i64::MAX,
                0,
            ));
        }
        if self.adjectives.is_empty() {
            return Err(ValidationError::empty_field("adjectives"));
        }
        Ok(())
    }
}

impl Default for SurveySettings {
    fn default() -> Self {
        Self {
            target_count: 30,
            adjectives: Adjective::ALL.to_vec(),
            balance: BalancePolicy::Strict,
            require_consent: false,
        }
    }
}

/// Progress indicator for the voting screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub consumed: usize,
    pub target: usize,
}

impl Progress {
    /// Completed fraction in `[0.0, 1.0]`.
    pub fn fraction(&self) -> f32 {
        if self.target == 0 {
            return 1.0;
        }
        (self.consumed as f32 / self.target as f32).min(1.0)
    }
}

/// One participant's survey session.
///
/// # Invariants
///
/// - `consumed_count() == decisions().len() <= target_count`
/// - at most one trial is pending, and only while `Voting`
/// - `Completed` exactly when `consumed_count() == target_count`
#[derive(Debug, Clone)]
pub struct SurveySession {
    id: SessionId,
    settings: SurveySettings,
    phase: SurveyPhase,
    consent_given: bool,
    role: Option<ParticipantRole>,
    language: Option<Locale>,
    pool: Option<AdjectivePool>,
    log: Vec<Decision>,
    current: Option<Trial>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl SurveySession {
    /// Creates a session in `Onboarding`.
    pub fn new(settings: SurveySettings) -> Result<Self, ValidationError> {
        settings.validate()?;
        let now = Timestamp::now();
        Ok(Self {
            id: SessionId::new(),
            settings,
            phase: SurveyPhase::Onboarding,
            consent_given: false,
            role: None,
            language: None,
            pool: None,
            log: Vec::new(),
            current: None,
            created_at: now,
            updated_at: now,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn settings(&self) -> &SurveySettings {
        &self.settings
    }

    pub fn phase(&self) -> SurveyPhase {
        self.phase
    }

    pub fn role(&self) -> Option<ParticipantRole> {
        self.role
    }

    pub fn language(&self) -> Option<&Locale> {
        self.language.as_ref()
    }

    pub fn consent_given(&self) -> bool {
        self.consent_given
    }

    /// Ordered decision log.
    pub fn decisions(&self) -> &[Decision] {
        &self.log
    }

    pub fn consumed_count(&self) -> usize {
        self.log.len()
    }

    pub fn target_count(&self) -> usize {
        self.settings.target_count
    }

    pub fn progress(&self) -> Progress {
        Progress {
            consumed: self.consumed_count(),
            target: self.settings.target_count,
        }
    }

    /// Trial currently on screen, if one has been drawn.
    pub fn pending_trial(&self) -> Option<&Trial> {
        self.current.as_ref()
    }

    /// Whether the "Back" control should be enabled.
    pub fn can_undo(&self) -> bool {
        self.phase == SurveyPhase::Voting && !self.log.is_empty()
    }

    pub fn is_completed(&self) -> bool {
        self.phase == SurveyPhase::Completed
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Ticks the onboarding consent box.
    ///
    /// # Errors
    ///
    /// - `InvalidState` outside `Onboarding`
    pub fn acknowledge_consent(&mut self) -> Result<(), SurveyError> {
        self.ensure_phase(SurveyPhase::Onboarding, "acknowledge consent")?;
        self.consent_given = true;
        self.touch();
        Ok(())
    }

    /// Leaves onboarding with the participant's role and language.
    ///
    /// Shuffles the adjective pool for the whole session.
    ///
    /// # Errors
    ///
    /// - `ConsentRequired` if the consent gate is enabled and not acknowledged
    /// - `InvalidState` outside `Onboarding`
    /// - `Validation` if the adjective pool cannot be built
    pub fn begin<R: Rng>(
        &mut self,
        role: ParticipantRole,
        language: Option<Locale>,
        sequencer: &mut TrialSequencer<R>,
    ) -> Result<(), SurveyError> {
        self.ensure_phase(SurveyPhase::Onboarding, "begin voting")?;
        if self.settings.require_consent && !self.consent_given {
            return Err(SurveyError::ConsentRequired);
        }

        let pool = sequencer.adjective_pool(
            &self.settings.adjectives,
            self.settings.target_count,
            self.settings.balance,
        )?;
        self.begin_with_pool(role, language, pool)
    }

    /// Like [`begin`](Self::begin) with a caller-supplied adjective order.
    ///
    /// # Errors
    ///
    /// - `ConsentRequired`, `InvalidState` as for `begin`
    /// - `Validation` if `pool` does not hold exactly `target_count` entries
    pub fn begin_with_pool(
        &mut self,
        role: ParticipantRole,
        language: Option<Locale>,
        pool: AdjectivePool,
    ) -> Result<(), SurveyError> {
        self.ensure_phase(SurveyPhase::Onboarding, "begin voting")?;
        if self.settings.require_consent && !self.consent_given {
            return Err(SurveyError::ConsentRequired);
        }
        if pool.len() != self.settings.target_count {
            return Err(ValidationError::out_of_range(
                "adjective_pool",
                self.settings.target_count as i64,
                self.settings.target_count as i64,
                pool.len() as i64,
            )
            .into());
        }

        self.phase = self.phase.transition_to(SurveyPhase::Voting)?;
        self.role = Some(role);
        self.language = language;
        self.pool = Some(pool);
        self.touch();
        info!(session_id = %self.id, role = %role, "Survey session started voting");
        Ok(())
    }

    /// Returns the pending trial, drawing one first if none is pending.
    ///
    /// # Errors
    ///
    /// - `InvalidState` outside `Voting`
    /// - `InsufficientItems` / `PoolExhausted` from the sequencer
    pub fn current_trial<R: Rng>(
        &mut self,
        sequencer: &mut TrialSequencer<R>,
        catalog: &ItemCatalog,
    ) -> Result<&Trial, SurveyError> {
        self.ensure_phase(SurveyPhase::Voting, "draw a trial")?;
        if self.current.is_none() {
            let pool = self
                .pool
                .as_ref()
                .ok_or(SurveyError::invalid_state("draw a trial", self.phase))?;
            let trial = sequencer.next_trial(catalog, pool, self.log.len())?;
            self.current = Some(trial);
        }
        self.current.as_ref().ok_or(SurveyError::NoTrialPending)
    }

    /// Resolves the pending trial with the participant's choice.
    ///
    /// Completes the session when the target count is reached.
    ///
    /// # Errors
    ///
    /// - `InvalidState` outside `Voting`
    /// - `NoTrialPending` if no trial has been drawn
    pub fn advance<R: Rng>(
        &mut self,
        chosen: Side,
        sequencer: &TrialSequencer<R>,
    ) -> Result<Decision, SurveyError> {
        self.ensure_phase(SurveyPhase::Voting, "record a decision")?;
        let respondent = self.respondent()?;
        let trial = self.current.take().ok_or(SurveyError::NoTrialPending)?;

        let decision = sequencer.record_decision(&trial, chosen, &respondent);
        self.log.push(decision.clone());
        self.touch();

        if self.log.len() >= self.settings.target_count {
            self.phase = self.phase.transition_to(SurveyPhase::Completed)?;
            info!(
                session_id = %self.id,
                decisions = self.log.len(),
                "Survey session completed"
            );
        }
        Ok(decision)
    }

    /// Takes back the latest decision and puts its trial back on screen.
    ///
    /// Any trial pending at the time is discarded.
    ///
    /// # Errors
    ///
    /// - `InvalidState` outside `Voting`
    /// - `EmptyLog` if nothing has been decided yet
    pub fn undo<R: Rng>(&mut self, sequencer: &TrialSequencer<R>) -> Result<&Trial, SurveyError> {
        self.ensure_phase(SurveyPhase::Voting, "undo")?;
        let restored = sequencer.undo(&mut self.log)?;
        self.current = Some(restored);
        self.touch();
        self.current.as_ref().ok_or(SurveyError::NoTrialPending)
    }

    /// Drops the pending trial without recording it.
    ///
    /// # Errors
    ///
    /// - `InvalidState` outside `Voting`
    /// - `NoTrialPending` if no trial has been drawn
    pub fn skip<R: Rng>(&mut self, sequencer: &TrialSequencer<R>) -> Result<(), SurveyError> {
        self.ensure_phase(SurveyPhase::Voting, "skip")?;
        let trial = self.current.take().ok_or(SurveyError::NoTrialPending)?;
        sequencer.skip(trial);
        self.touch();
        Ok(())
    }

    /// Clears everything and returns to `Onboarding` under a fresh id.
    ///
    /// Settings survive the reset.
    pub fn reset(&mut self) {
        if self.phase != SurveyPhase::Onboarding {
            info!(session_id = %self.id, phase = %self.phase, "Survey session reset");
        }
        let now = Timestamp::now();
        self.id = SessionId::new();
        self.phase = SurveyPhase::Onboarding;
        self.consent_given = false;
        self.role = None;
        self.language = None;
        self.pool = None;
        self.log.clear();
        self.current = None;
        self.created_at = now;
        self.updated_at = now;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn ensure_phase(&self, expected: SurveyPhase, action: &'static str) -> Result<(), SurveyError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SurveyError::invalid_state(action, self.phase))
        }
    }

    fn respondent(&self) -> Result<Respondent, SurveyError> {
        let role = self
            .role
            .ok_or(SurveyError::invalid_state("record a decision", self.phase))?;
        Ok(Respondent {
            session_id: self.id,
            role,
            language: self.language.clone(),
        })
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
