//! Survey configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::catalog::Adjective;
use crate::domain::survey::{BalancePolicy, SurveySettings};

/// Survey configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyConfig {
    /// Decisions per session
    #[serde(default = "default_target_count")]
    pub target_count: usize,

    /// Adjective names, case-insensitive
    #[serde(default = "default_adjectives")]
    pub adjectives: Vec<String>,

    /// Whether the target may be split unevenly across adjectives
    #[serde(default)]
    pub balance: BalancePolicy,

    /// Show a consent gate before voting
    #[serde(default)]
    pub require_consent: bool,

    /// Fixed RNG seed, for reproducible sessions
    pub seed: Option<u64>,
}

impl SurveyConfig {
    /// Parsed adjective set.
    pub fn adjective_set(&self) -> Result<Vec<Adjective>, ValidationError> {
        self.adjectives
            .iter()
            .map(|name| {
                name.parse::<Adjective>()
                    .map_err(|_| ValidationError::UnknownAdjective(name.clone()))
            })
            .collect()
    }

    /// Session settings described by this section.
    pub fn settings(&self) -> Result<SurveySettings, ValidationError> {
        Ok(SurveySettings {
            target_count: self.target_count,
            adjectives: self.adjective_set()?,
            balance: self.balance,
            require_consent: self.require_consent,
        })
    }

    /// Validate survey configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.target_count == 0 {
            return Err(ValidationError::InvalidTargetCount);
        }
        let mut adjectives = self.adjective_set()?;
        adjectives.sort();
        adjectives.dedup();
        if adjectives.is_empty() {
            return Err(ValidationError::MissingRequired("survey.adjectives"));
        }
        if self.balance == BalancePolicy::Strict && self.target_count % adjectives.len() != 0 {
            return Err(ValidationError::UnbalancedTarget {
                target: self.target_count,
                adjectives: adjectives.len(),
            });
        }
        Ok(())
    }
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            target_count: default_target_count(),
            adjectives: default_adjectives(),
            balance: BalancePolicy::default(),
            require_consent: false,
            seed: None,
        }
    }
}

fn default_target_count() -> usize {
    30
}

fn default_adjectives() -> Vec<String> {
    Adjective::ALL.iter().map(|a| a.label().to_string()).collect()
}
