//! Error types for review sessions

use std::path::PathBuf;

/// Errors from toggling or committing reviewed hunks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    /// Hunk index out of range
    #[error("no hunk {index} (block has {len})")]
    UnknownHunk {
        /// Requested index
        index: usize,
        /// Number of hunks in the block
        len: usize,
    },

    /// No block for this path in the session
    #[error("no diff block for {}", .0.display())]
    UnknownPath(PathBuf),
}
