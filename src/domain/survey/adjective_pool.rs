//! Pre-shuffled adjective multiset consumed in order, one entry per trial.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::SurveyError;
use crate::domain::catalog::Adjective;
use crate::domain::foundation::ValidationError;

/// How to handle a target count that is not a multiple of the adjective set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancePolicy {
    /// Refuse to build a pool unless every adjective appears equally often.
    #[default]
    Strict,
    /// Allow per-adjective counts to differ by at most one.
    AllowUneven,
}

/// Ordered adjectives for a whole session; position `n` belongs to trial `n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjectivePool {
    order: Vec<Adjective>,
}

impl AdjectivePool {
    /// Builds a shuffled pool of exactly `target_count` adjectives.
    ///
    /// Repeated adjectives in `adjectives` are ignored.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if no adjectives are given
    /// - `OutOfRange` if `target_count` is zero
    /// - `InvalidFormat` under [`BalancePolicy::Strict`] when `target_count`
    ///   is not a multiple of the adjective count
    pub fn balanced<R: Rng + ?Sized>(
        adjectives: &[Adjective],
        target_count: usize,
        policy: BalancePolicy,
        rng: &mut R,
    ) -> Result<Self, ValidationError> {
        let mut set: Vec<Adjective> = Vec::with_capacity(adjectives.len());
        for adj in adjectives {
            if !set.contains(adj) {
                set.push(*adj);
            }
        }
        if set.is_empty() {
            return Err(ValidationError::empty_field("adjectives"));
        }
        if target_count == 0 {
            return Err(ValidationError::out_of_range(
                "target_count",
                1,
                i64::MAX,
                0,
            ));
        }

        let remainder = target_count % set.len();
        if remainder != 0 && policy == BalancePolicy::Strict {
            return Err(ValidationError::invalid_format(
                "target_count",
                format!(
                    "{} trials cannot be split evenly across {} adjectives",
                    target_count,
                    set.len()
                ),
            ));
        }

        let repeats = target_count / set.len();
        let mut order: Vec<Adjective> = Vec::with_capacity(target_count);
        for _ in 0..repeats {
            order.extend_from_slice(&set);
        }
        order.extend(set.choose_multiple(rng, remainder).copied());
        order.shuffle(rng);

        Ok(Self { order })
    }

    /// Uses a caller-supplied order verbatim.
    pub fn from_order(order: Vec<Adjective>) -> Self {
        Self { order }
    }

    /// Adjective for the trial at `position`.
    ///
    /// # Errors
    ///
    /// - `PoolExhausted` if `position >= len()`
    pub fn at(&self, position: usize) -> Result<Adjective, SurveyError> {
        self.order
            .get(position)
            .copied()
            .ok_or(SurveyError::PoolExhausted {
                position,
                len: self.order.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[Adjective] {
        &self.order
    }

    /// Occurrences of each adjective in the pool.
    pub fn counts(&self) -> BTreeMap<Adjective, usize> {
        let mut counts = BTreeMap::new();
        for adj in &self.order {
            *counts.entry(*adj).or_insert(0) += 1;
        }
        counts
    }
}
