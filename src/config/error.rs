//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Target count must be at least 1")]
    InvalidTargetCount,

    #[error("Unknown adjective: {0}")]
    UnknownAdjective(String),

    #[error("Target count {target} is not a multiple of {adjectives} adjective(s)")]
    UnbalancedTarget { target: usize, adjectives: usize },

    #[error("Invalid image extension: {0}")]
    InvalidExtension(String),

    #[error("Case must be a single directory name")]
    InvalidCase,
}
