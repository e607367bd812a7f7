//! Error types for composition
//!
//! None of these abort a batch: a malformed proposal is dropped and
//! reported, and the rest of the batch proceeds.

use plandoc_artifact::SliceError;

/// Why a producer proposal could not be used
#[derive(Debug, thiserror::Error)]
pub enum ProposalError {
    /// Required field absent
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// Required field present but blank
    #[error("required field '{0}' is empty")]
    EmptyField(&'static str),

    /// Destination is neither a section name nor `discard`
    #[error("invalid destination: '{0}'")]
    InvalidDestination(String),

    /// Source file name cannot be written into a provenance marker
    #[error("source file name cannot appear in a provenance marker: '{0}'")]
    InvalidSourceFile(String),

    /// Log date not in `YYYY-MM-DD` form
    #[error("invalid date: '{0}'")]
    InvalidDate(String),

    /// `kind` names no known producer
    #[error("unknown producer kind: '{0}'")]
    UnknownKind(String),

    /// Confidence outside `0.0..=1.0`
    #[error("confidence out of range: {0}")]
    InvalidConfidence(f32),

    /// Suggested slice link could not be read
    #[error("invalid slice link: {0}")]
    InvalidSliceLink(#[from] SliceError),

    /// Payload is not valid JSON or has wrongly typed fields
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload is neither a list nor `{"proposals": [...]}`
    #[error("expected a JSON array of proposals")]
    NotABatch,
}

impl ProposalError {
    /// Whether the error is about a missing or blank field
    #[must_use]
    pub fn is_missing_field(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::EmptyField(_))
    }
}
