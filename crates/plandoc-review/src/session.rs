//! Review sessions
//!
//! A [`ReviewSession`] holds one [`DiffBlock`] per touched document while a
//! reviewer toggles hunks. It is advisory state: nothing is written until
//! [`ReviewSession::commit`], which re-validates every accepted hunk against
//! the live text. Dropping a session discards it with no I/O.

use crate::diff::{CommitResult, DiffBlock, DiffEngine};
use crate::error::ReviewError;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Pending diff blocks keyed by document path
#[derive(Debug, Clone, Default)]
pub struct ReviewSession {
    engine: DiffEngine,
    blocks: IndexMap<PathBuf, DiffBlock>,
}

impl ReviewSession {
    /// Empty session using `engine` for new blocks
    #[must_use]
    pub fn new(engine: DiffEngine) -> Self {
        Self {
            engine,
            blocks: IndexMap::new(),
        }
    }

    /// Diff `original` against `proposed` for `path`, replacing any block
    /// already held for it. Identical texts add nothing.
    pub fn propose(&mut self, path: impl Into<PathBuf>, original: &str, proposed: &str) -> bool {
        let path = path.into();
        let block = self
            .engine
            .diff(original, proposed)
            .with_path(path.display().to_string());
        if block.is_empty() {
            self.blocks.shift_remove(&path);
            return false;
        }
        self.blocks.insert(path, block);
        true
    }

    /// Paths with pending blocks, in the order they were proposed
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.blocks.keys().map(PathBuf::as_path)
    }

    /// Block for a path
    #[must_use]
    pub fn block(&self, path: &Path) -> Option<&DiffBlock> {
        self.blocks.get(path)
    }

    /// Block for a path, to toggle hunks
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::UnknownPath`] if the session holds no block for `path`.
    pub fn block_mut(&mut self, path: &Path) -> Result<&mut DiffBlock, ReviewError> {
        self.blocks
            .get_mut(path)
            .ok_or_else(|| ReviewError::UnknownPath(path.to_path_buf()))
    }

    /// Whether the session holds no blocks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Drop the block for a path
    pub fn discard(&mut self, path: &Path) -> Option<DiffBlock> {
        self.blocks.shift_remove(path)
    }

    /// All blocks as one unified diff, one block per file
    #[must_use]
    pub fn render_unified(&self) -> String {
        self.blocks.values().map(DiffBlock::render_unified).collect()
    }

    /// Apply the accepted hunks for `path` to its live text, keeping the block
    ///
    /// The block stays open so the decisions survive a failed write; close
    /// it with [`Self::discard`] once the result is stored.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::UnknownPath`] if the session holds no block for `path`.
    pub fn prepare_commit(&self, path: &Path, current: &str) -> Result<CommitResult, ReviewError> {
        let block = self
            .blocks
            .get(path)
            .ok_or_else(|| ReviewError::UnknownPath(path.to_path_buf()))?;
        let result = block.apply_accepted_to(current);
        info!(
            path = %path.display(),
            applied = result.applied.len(),
            stale = result.stale.len(),
            pending = result.pending.len(),
            "review committed"
        );
        Ok(result)
    }

    /// Apply the accepted hunks for `path` to its live text and close the block
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::UnknownPath`] if the session holds no block for `path`.
    pub fn commit(&mut self, path: &Path, current: &str) -> Result<CommitResult, ReviewError> {
        let result = self.prepare_commit(path, current)?;
        self.blocks.shift_remove(path);
        Ok(result)
    }
}
