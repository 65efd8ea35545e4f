//! Application configuration management.
//!
//! Settings are merged from several layers using `figment`, lowest priority
//! first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. `config.toml` in the platform config directory
//! 3. A file passed with `--config`
//! 4. `DUPECASES_*` environment variables (e.g. `DUPECASES_SORT_DIRECTION`)
//! 5. CLI flags, applied by the caller on top of the loaded config
//!
//! Unknown keys are rejected with a suggestion for the closest known key.
//!
//! # Example file
//!
//! ```toml
//! sort_direction = "descending"
//! primary_selection = "first"
//! sequence_count = true
//! sequence_indicator_name = "DupSeq"
//! move_matching_to_top = false
//! delimiter = ";"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::value::Dict;
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duplicates::{PrimarySelection, SortDirection};
use crate::error::suggest_similar;
use crate::worker::DEFAULT_SEQUENCE_NAME;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DUPECASES_";

/// Every key a config layer may set.
pub const KNOWN_KEYS: &[&str] = &[
    "sort_direction",
    "primary_selection",
    "primary_indicator_name",
    "sequence_count",
    "sequence_indicator_name",
    "move_matching_to_top",
    "display_frequencies",
    "delimiter",
];

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer could not be parsed or extracted.
    #[error("invalid configuration: {0}")]
    Load(Box<figment::Error>),

    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    Missing(PathBuf),

    /// A layer set a key that does not exist.
    #[error("unknown config key {key:?}{}", .suggestion.map(|s| format!(" (did you mean {s:?}?)")).unwrap_or_default())]
    UnknownKey {
        key: String,
        suggestion: Option<&'static str>,
    },

    /// The delimiter is not a single ASCII character.
    #[error("delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Direction applied to all sorting variables.
    pub sort_direction: SortDirection,
    /// Which sorted case in a group is primary.
    pub primary_selection: PrimarySelection,
    /// Primary indicator name; derived from `primary_selection` if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_indicator_name: Option<String>,
    /// Create the sequence indicator variable.
    pub sequence_count: bool,
    /// Sequence indicator name.
    pub sequence_indicator_name: String,
    /// Move matching cases to the top of the file.
    pub move_matching_to_top: bool,
    /// Record frequency tables.
    pub display_frequencies: bool,
    /// CSV field delimiter for input and output.
    pub delimiter: char,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sort_direction: SortDirection::Ascending,
            primary_selection: PrimarySelection::Last,
            primary_indicator_name: None,
            sequence_count: false,
            sequence_indicator_name: DEFAULT_SEQUENCE_NAME.to_string(),
            move_matching_to_top: true,
            display_frequencies: true,
            delimiter: ',',
        }
    }
}

impl Config {
    /// Load the layered configuration using the platform config path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any layer is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from_path(&path, explicit),
            None => {
                log::debug!("No platform config directory; skipping user config file");
                Self::extract(Self::figment(None, explicit)?)
            }
        }
    }

    /// Load the layered configuration with an explicit user config path.
    ///
    /// A missing user config file is skipped; a missing `explicit` file is an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any layer is invalid.
    pub fn load_from_path(user_path: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::extract(Self::figment(Some(user_path), explicit)?)
    }

    fn figment(user_path: Option<&Path>, explicit: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = user_path.filter(|p| p.exists()) {
            log::debug!("Loading config from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::Missing(path.to_path_buf()));
            }
            log::debug!("Loading config from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let raw: Dict = figment.extract()?;
        if let Some(key) = raw.keys().find(|k| !KNOWN_KEYS.contains(&k.as_str())) {
            return Err(ConfigError::UnknownKey {
                key: key.clone(),
                suggestion: suggest_similar(key, KNOWN_KEYS.iter().copied()),
            });
        }

        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialization alone cannot.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidDelimiter`] for a non-ASCII delimiter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.delimiter.is_ascii() {
            return Err(ConfigError::InvalidDelimiter(self.delimiter));
        }
        Ok(())
    }

    /// Effective primary indicator name.
    #[must_use]
    pub fn primary_name(&self) -> String {
        self.primary_indicator_name
            .clone()
            .unwrap_or_else(|| self.primary_selection.default_indicator_name().to_string())
    }

    /// Default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupecases", "dupecases")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
