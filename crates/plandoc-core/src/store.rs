//! File-backed documents with a per-document apply queue
//!
//! Every read-modify-write of a document runs while holding that document's
//! queue lock, so two applies to the same path never interleave. Different
//! paths have different locks and proceed concurrently. Parsing goes
//! through a content-hash cache; a document edited on disk simply hashes to
//! a new key.

use crate::error::{EngineError, Result};
use crate::reconciler::{Reconciler, Reconciliation};
use crate::report::ReconcileReport;
use dashmap::DashMap;
use plandoc_artifact::Document;
use plandoc_composition::{ChangeProposal, HistoryEntry, ProposalNormalizer};
use plandoc_parser::{CacheStats, DocumentCache};
use plandoc_review::{CommitResult, DiffBlock, ReviewSession};
use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Documents on disk, reconciled one writer at a time per path
#[derive(Debug)]
pub struct DocumentStore {
    reconciler: Reconciler,
    cache: DocumentCache,
    queues: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl DocumentStore {
    /// Create a store around a reconciler
    #[must_use]
    pub fn new(reconciler: Reconciler) -> Self {
        let config = reconciler.config();
        let parser = reconciler.parser().clone();
        let cache = match config.cache_ttl() {
            Some(ttl) => DocumentCache::with_ttl(parser, config.cache_capacity, ttl),
            None => DocumentCache::new(parser, config.cache_capacity),
        };
        Self {
            reconciler,
            cache,
            queues: DashMap::new(),
        }
    }

    /// Pipeline used for every apply
    #[inline]
    #[must_use]
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Parse cache statistics
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Read and parse a document with the configured vocabulary
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if the file cannot be read.
    pub async fn parse(&self, path: &Path) -> Result<Arc<Document>> {
        let text = read_text(path).await?;
        Ok(self.cache.parse(&text).await)
    }

    /// Diff preview of a batch against the file's current text
    ///
    /// A missing file previews as an empty document.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if the file exists but cannot be read.
    pub async fn preview(
        &self,
        path: &Path,
        proposals: &[ChangeProposal],
        normalizer: &ProposalNormalizer,
    ) -> Result<(DiffBlock, ReconcileReport)> {
        let text = read_or_empty(path).await?;
        let reconciliation = self.reconcile(&text, proposals, normalizer).await;
        let block = self
            .reconciler
            .diff_engine()
            .diff(&text, &reconciliation.text)
            .with_path(path.display().to_string());
        Ok((block, reconciliation.report))
    }

    /// Apply a batch to the file and write the result
    ///
    /// Holds the document's queue lock for the whole read-modify-write. A
    /// missing file is treated as empty and created. With `dry_run` nothing
    /// is written.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if the file cannot be read or written.
    pub async fn apply(
        &self,
        path: &Path,
        proposals: &[ChangeProposal],
        normalizer: &ProposalNormalizer,
        dry_run: bool,
    ) -> Result<ReconcileReport> {
        let key = queue_key(path).await;
        let turn = self.queue(&key).lock_owned().await;

        let result: Result<ReconcileReport> = async {
            let text = read_or_empty(path).await?;
            let reconciliation = self.reconcile(&text, proposals, normalizer).await;
            if reconciliation.report.changed() && !dry_run {
                write_text(path, &reconciliation.text).await?;
                self.cache.invalidate(&reconciliation.report.base_hash).await;
                info!(path = %path.display(), report = %reconciliation.report, "document updated");
            } else {
                debug!(path = %path.display(), dry_run, "document left unchanged");
            }
            Ok(reconciliation.report)
        }
        .await;

        drop(turn);
        self.release(&key);
        result
    }

    /// Commit the reviewed hunks for `path` against the file's current text
    ///
    /// Accepted hunks are re-validated against what is on disk now; stale
    /// hunks are reported and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Review`] if the session has no block for
    /// `path`, or [`EngineError::Io`] if the file cannot be read or written.
    pub async fn commit_review(
        &self,
        session: &mut ReviewSession,
        path: &Path,
    ) -> Result<CommitResult> {
        let key = queue_key(path).await;
        let turn = self.queue(&key).lock_owned().await;

        let result: Result<CommitResult> = async {
            let current = read_or_empty(path).await?;
            let result = session.prepare_commit(path, &current)?;
            if result.text != current {
                write_text(path, &result.text).await?;
            }
            session.discard(path);
            Ok(result)
        }
        .await;

        drop(turn);
        self.release(&key);
        result
    }

    /// Where each proposal already lives in the file
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if the file cannot be read.
    pub async fn history(
        &self,
        path: &Path,
        proposals: &[ChangeProposal],
        normalizer: &ProposalNormalizer,
    ) -> Result<Vec<HistoryEntry>> {
        let text = read_text(path).await?;
        Ok(self.reconciler.history(&text, proposals, normalizer))
    }

    async fn reconcile(
        &self,
        text: &str,
        proposals: &[ChangeProposal],
        normalizer: &ProposalNormalizer,
    ) -> Reconciliation {
        match self.reconciler.parser_for(proposals, normalizer) {
            Cow::Borrowed(_) => {
                let doc = self.cache.parse(text).await;
                self.reconciler
                    .reconcile_document(&doc, text, proposals, normalizer)
            }
            Cow::Owned(parser) => {
                let doc = parser.parse(text);
                self.reconciler
                    .reconcile_document(&doc, text, proposals, normalizer)
            }
        }
    }

    fn queue(&self, key: &Path) -> Arc<Mutex<()>> {
        self.queues
            .entry(key.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the queue entry once no apply holds or waits on it
    fn release(&self, key: &Path) {
        self.queues
            .remove_if(key, |_, queue| Arc::strong_count(queue) == 1);
    }

    /// Number of documents with a live queue entry
    #[must_use]
    pub fn active_queues(&self) -> usize {
        self.queues.len()
    }
}

/// Queue key for `path`: the canonical parent directory joined with the file
/// name, so the key is the same before and after the file is created
async fn queue_key(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };
    let (Some(parent), Some(name)) = (absolute.parent(), absolute.file_name()) else {
        return absolute;
    };
    match tokio::fs::canonicalize(parent).await {
        Ok(parent) => parent.join(name),
        Err(_) => absolute,
    }
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| EngineError::io_error(path, e))
}

async fn read_or_empty(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(EngineError::io_error(path, e)),
    }
}

async fn write_text(path: &Path, text: &str) -> Result<()> {
    tokio::fs::write(path, text)
        .await
        .map_err(|e| EngineError::io_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use plandoc_composition::Destination;
    use tempfile::TempDir;

    fn store() -> DocumentStore {
        DocumentStore::new(Reconciler::new(EngineConfig::default()).unwrap())
    }

    fn proposal(text: &str) -> ChangeProposal {
        ChangeProposal::groomed(text, "Ideas.md", Some(text), Destination::section("Current").unwrap())
    }

    #[tokio::test]
    async fn apply_writes_and_reports() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Tasks.md");
        tokio::fs::write(&path, "## Current\n").await.unwrap();

        let store = store();
        let report = store
            .apply(&path, &[proposal("A")], &ProposalNormalizer::new(), false)
            .await
            .unwrap();
        assert!(report.changed());
        let text = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(text, "## Current\n- [ ] A <!-- from Ideas.md: A -->\n");
    }

    #[tokio::test]
    async fn dry_run_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Tasks.md");
        tokio::fs::write(&path, "## Current\n").await.unwrap();

        let report = store()
            .apply(&path, &[proposal("A")], &ProposalNormalizer::new(), true)
            .await
            .unwrap();
        assert!(report.changed());
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "## Current\n");
    }

    #[tokio::test]
    async fn missing_file_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("New.md");
        store()
            .apply(&path, &[proposal("A")], &ProposalNormalizer::new(), false)
            .await
            .unwrap();
        assert_eq!(
            tokio::fs::read_to_string(&path).await.unwrap(),
            "## Current\n- [ ] A <!-- from Ideas.md: A -->\n"
        );
    }

    #[tokio::test]
    async fn parse_of_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = store().parse(&dir.path().join("nope.md")).await.unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }

    #[tokio::test]
    async fn same_path_shares_a_queue() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Tasks.md");
        tokio::fs::write(&path, "").await.unwrap();
        let store = store();
        let a = store.queue(&queue_key(&path).await);
        let b = store.queue(&queue_key(&dir.path().join(".").join("Tasks.md")).await);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn queue_key_is_stable_across_creation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Later.md");
        let before = queue_key(&path).await;
        tokio::fs::write(&path, "").await.unwrap();
        assert_eq!(queue_key(&path).await, before);
        assert_eq!(queue_key(&dir.path().join(".").join("Later.md")).await, before);
    }

    #[tokio::test]
    async fn idle_queues_are_released() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Tasks.md");
        let store = store();
        store
            .apply(&path, &[proposal("A")], &ProposalNormalizer::new(), false)
            .await
            .unwrap();
        assert_eq!(store.active_queues(), 0);
    }
}
