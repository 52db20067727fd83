//! Compiler configuration
//!
//! Configuration can be built in code or loaded from a TOML file:
//!
//! ```toml
//! chunk_budget = 16383
//! root_type = "Component"
//! emit_comments = true
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::metadata::DEFAULT_ROOT_TYPE;
use crate::synth::MAX_LITERAL_CHUNK;

/// Errors that can occur when loading a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("chunk_budget must be at least 1")]
    InvalidChunkBudget,
}

/// Settings for template compilation
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerConfig {
    /// Characters per generated string constant
    pub chunk_budget: usize,
    /// Base type where computed property inheritance stops
    pub root_type: String,
    /// Write a `// <template path>` comment at the top of each resource
    pub emit_comments: bool,
}

/// TOML structure for deserializing configs
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    chunk_budget: Option<usize>,
    root_type: Option<String>,
    emit_comments: Option<bool>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            chunk_budget: MAX_LITERAL_CHUNK,
            root_type: DEFAULT_ROOT_TYPE.to_string(),
            emit_comments: true,
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_budget(mut self, budget: usize) -> Self {
        self.chunk_budget = budget;
        self
    }

    pub fn with_root_type(mut self, root_type: impl Into<String>) -> Self {
        self.root_type = root_type.into();
        self
    }

    pub fn with_comments(mut self, emit: bool) -> Self {
        self.emit_comments = emit;
        self
    }

    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load config from TOML string; missing keys keep their defaults
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let defaults = Self::default();

        let config = CompilerConfig {
            chunk_budget: parsed.chunk_budget.unwrap_or(defaults.chunk_budget),
            root_type: parsed.root_type.unwrap_or(defaults.root_type),
            emit_comments: parsed.emit_comments.unwrap_or(defaults.emit_comments),
        };
        if config.chunk_budget == 0 {
            return Err(ConfigError::InvalidChunkBudget);
        }
        Ok(config)
    }
}
