//! Engine configuration
//!
//! Configuration can be built in code with the `with_*` setters or loaded
//! from a TOML file:
//!
//! ```toml
//! accessor_prefix = "$"
//! preserve_whole_leaf_types = false
//! overwrite_user_keys = false
//! max_depth = 256
//!
//! [delimiters]
//! open = "{{"
//! close = "}}"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::template::Delimiters;

/// Errors that can occur when loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for rendering
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Markers around embedded expressions
    pub delimiters: Delimiters,

    /// Prefix of generated sequence accessors (`$` gives `$images`)
    pub accessor_prefix: String,

    /// When a string leaf is exactly one delimited expression, keep the
    /// result's native type instead of stringifying it
    pub preserve_whole_leaf_types: bool,

    /// Let generated accessors replace context entries that already use the
    /// accessor's name
    pub overwrite_user_keys: bool,

    /// Maximum nesting of template containers and resolved constructs
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            accessor_prefix: "$".to_string(),
            preserve_whole_leaf_types: false,
            overwrite_user_keys: false,
            max_depth: 256,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delimiters.open.is_empty() || self.delimiters.close.is_empty() {
            return Err(ConfigError::Invalid(
                "delimiters must not be empty".to_string(),
            ));
        }
        if self.accessor_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "accessor_prefix must not be empty".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the expression delimiters
    pub fn with_delimiters(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.delimiters = Delimiters::new(open, close);
        self
    }

    /// Set the accessor prefix
    pub fn with_accessor_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.accessor_prefix = prefix.into();
        self
    }

    /// Enable or disable native types for whole-leaf expressions
    pub fn with_preserve_whole_leaf_types(mut self, preserve: bool) -> Self {
        self.preserve_whole_leaf_types = preserve;
        self
    }

    /// Enable or disable replacing user entries with accessors
    pub fn with_overwrite_user_keys(mut self, overwrite: bool) -> Self {
        self.overwrite_user_keys = overwrite;
        self
    }

    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
