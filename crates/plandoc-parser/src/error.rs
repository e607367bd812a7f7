//! Error types for the parser
//!
//! Parsing itself never fails: unreadable lines become
//! [`ParseDiagnostic`](plandoc_artifact::ParseDiagnostic)s. Only building a
//! heading vocabulary can go wrong.

use plandoc_artifact::NameError;

/// Errors building a [`Vocabulary`](crate::Vocabulary)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VocabularyError {
    /// A configured section name was blank
    #[error("invalid task section name: {0}")]
    InvalidSectionName(#[from] NameError),

    /// A configured slice prefix was blank
    #[error("slice section prefix cannot be empty")]
    EmptySlicePrefix,

    /// No task sections configured
    #[error("vocabulary must name at least one task section")]
    NoTaskSections,
}
