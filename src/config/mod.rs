//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PERCEPTION_SURVEY` prefix and nested values use double underscores as separators.
//! Every value has a default, so an empty environment yields a working survey.
//!
//! # Example
//!
//! ```no_run
//! use perception_survey::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("{} decisions per session", config.survey.target_count);
//! ```

mod catalog;
mod error;
mod logging;
mod storage;
mod survey;

pub use catalog::CatalogConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use storage::StorageConfig;
pub use survey::SurveyConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Session length, adjectives, consent gate
    #[serde(default)]
    pub survey: SurveyConfig,

    /// Image directory and optional case
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Results files and persistence mode
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present
    /// 2. Reads environment variables with `PERCEPTION_SURVEY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Splits list values (`survey.adjectives`, `catalog.extensions`) on commas
    ///
    /// # Environment Variable Format
    ///
    /// - `PERCEPTION_SURVEY__SURVEY__TARGET_COUNT=12` -> `survey.target_count = 12`
    /// - `PERCEPTION_SURVEY__SURVEY__ADJECTIVES=safe,lively` -> `survey.adjectives = [safe, lively]`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PERCEPTION_SURVEY")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("survey.adjectives")
                    .with_list_parse_key("catalog.extensions"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load and validate in one step.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.survey.validate()?;
        self.catalog.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
