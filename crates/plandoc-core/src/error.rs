//! Error types for the plandoc engine
//!
//! Only I/O and configuration fail an operation. Everything that goes wrong
//! inside a batch (malformed proposals, stale directives, missing sections)
//! is recovered and reported in a [`ReconcileReport`](crate::ReconcileReport).

use plandoc_composition::ProposalError;
use plandoc_parser::VocabularyError;
use plandoc_review::ReviewError;
use std::path::PathBuf;

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Reading or writing a document failed
    #[error("io error on {path}: {source}")]
    Io {
        /// Document path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid TOML for [`EngineConfig`](crate::EngineConfig)
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration value out of range
    #[error("invalid config value for '{field}': {message}")]
    ConfigValue {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// Section vocabulary rejected
    #[error("vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),

    /// Proposal payload could not be read at all
    #[error("proposal payload error: {0}")]
    Proposal(#[from] ProposalError),

    /// Review session misuse
    #[error("review error: {0}")]
    Review(#[from] ReviewError),
}

impl EngineError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create config value error
    pub fn config_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::ConfigValue {
            field,
            message: message.into(),
        }
    }
}

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
