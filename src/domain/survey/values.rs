//! Small value objects shared by trials, decisions and sessions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Position an item occupies on screen ("Image A" is left, "Image B" right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            other => Err(ValidationError::invalid_format(
                "side",
                format!("expected 'left' or 'right', got '{}'", other),
            )),
        }
    }
}

/// Self-declared relationship of the participant to the surveyed area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantRole {
    /// Lives or works in the area.
    Resident,
    /// Visiting or travelling.
    Tourist,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Resident => "Resident",
            ParticipantRole::Tourist => "Tourist",
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resident" => Ok(ParticipantRole::Resident),
            "tourist" => Ok(ParticipantRole::Tourist),
            other => Err(ValidationError::invalid_format(
                "user_type",
                format!("unknown participant role '{}'", other),
            )),
        }
    }
}

/// Language tag chosen at onboarding, e.g. `en` or `pt-br`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Maximum accepted tag length.
    pub const MAX_LEN: usize = 35;

    /// Creates a locale, normalising to lowercase.
    ///
    /// # Errors
    ///
    /// - `EmptyField` for blank input
    /// - `InvalidFormat` for characters other than ASCII alphanumerics and `-`
    pub fn new(tag: impl AsRef<str>) -> Result<Self, ValidationError> {
        let tag = tag.as_ref().trim();
        if tag.is_empty() {
            return Err(ValidationError::empty_field("language"));
        }
        if tag.len() > Self::MAX_LEN
            || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            || tag.starts_with('-')
            || tag.ends_with('-')
        {
            return Err(ValidationError::invalid_format(
                "language",
                format!("'{}' is not a language tag", tag),
            ));
        }
        Ok(Self(tag.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::new(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Locale::new(value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}
