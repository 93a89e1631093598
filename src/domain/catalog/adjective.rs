//! Perceptual adjectives participants judge image pairs against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// A perceptual quality drawn from a fixed, closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Adjective {
    Safe,
    Lively,
    Wealthy,
    Beautiful,
    Boring,
    Depressing,
}

impl Adjective {
    /// Every adjective, in canonical order.
    pub const ALL: [Adjective; 6] = [
        Adjective::Safe,
        Adjective::Lively,
        Adjective::Wealthy,
        Adjective::Beautiful,
        Adjective::Boring,
        Adjective::Depressing,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Adjective::Safe => "Safe",
            Adjective::Lively => "Lively",
            Adjective::Wealthy => "Wealthy",
            Adjective::Beautiful => "Beautiful",
            Adjective::Boring => "Boring",
            Adjective::Depressing => "Depressing",
        }
    }

    /// Question shown above a trial.
    pub fn prompt(&self) -> String {
        format!("Which street looks more {}?", self.label().to_lowercase())
    }
}

impl fmt::Display for Adjective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Adjective {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Adjective::ALL
            .into_iter()
            .find(|adj| adj.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                ValidationError::invalid_format("adjective", format!("unknown adjective '{}'", s))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("lively".parse::<Adjective>().unwrap(), Adjective::Lively);
        assert_eq!(" SAFE ".parse::<Adjective>().unwrap(), Adjective::Safe);
    }

    #[test]
    fn rejects_unknown_label() {
        assert!("Noisy".parse::<Adjective>().is_err());
    }

    #[test]
    fn display_and_parse_agree_for_every_adjective() {
        for adj in Adjective::ALL {
            assert_eq!(adj.to_string().parse::<Adjective>().unwrap(), adj);
        }
    }

    #[test]
    fn prompt_lowercases_label() {
        assert_eq!(
            Adjective::Depressing.prompt(),
            "Which street looks more depressing?"
        );
    }
}
