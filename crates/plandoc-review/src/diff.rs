//! Line diffs with per-hunk review state
//!
//! [`DiffEngine::diff`] aligns two texts line by line (LCS via `diffy`) and
//! cuts the result into [`DiffHunk`]s with a fixed context window. Hunks are
//! split wherever an unchanged run is longer than the window, so each hunk
//! covers one changed region plus its context and can be reviewed alone.
//!
//! Lines keep their terminators, which makes reconstruction byte-exact,
//! including a missing newline at end of file.

use crate::error::ReviewError;
use diffy::{DiffOptions, Line};
use plandoc_artifact::ContentHash;
use serde::Serialize;
use tracing::{debug, warn};

/// Default number of context lines around a change
pub const DEFAULT_CONTEXT: usize = 2;

/// Review state of one hunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HunkStatus {
    /// Not reviewed yet; treated as rejected on commit
    #[default]
    Pending,
    /// Take the new side
    Accepted,
    /// Keep the old side
    Rejected,
}

/// One line of a hunk, terminator included
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "camelCase")]
pub enum DiffLine {
    /// Present on both sides
    Context(String),
    /// Only on the old side
    Removed(String),
    /// Only on the new side
    Added(String),
}

impl DiffLine {
    fn text(&self) -> &str {
        match self {
            Self::Context(text) | Self::Removed(text) | Self::Added(text) => text,
        }
    }

    fn on_old_side(&self) -> bool {
        !matches!(self, Self::Added(_))
    }

    fn on_new_side(&self) -> bool {
        !matches!(self, Self::Removed(_))
    }

    fn prefix(&self) -> char {
        match self {
            Self::Context(_) => ' ',
            Self::Removed(_) => '-',
            Self::Added(_) => '+',
        }
    }
}

/// A contiguous run of changed lines with surrounding context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffHunk {
    /// Zero-based first old line covered
    pub old_start: usize,
    /// Zero-based first new line covered
    pub new_start: usize,
    /// Lines in order
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    /// Number of old lines the hunk spans
    #[must_use]
    pub fn old_len(&self) -> usize {
        self.lines.iter().filter(|l| l.on_old_side()).count()
    }

    /// Number of new lines the hunk spans
    #[must_use]
    pub fn new_len(&self) -> usize {
        self.lines.iter().filter(|l| l.on_new_side()).count()
    }

    /// Old side text, line by line
    pub fn old_side(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter(|l| l.on_old_side()).map(DiffLine::text)
    }

    /// New side text, line by line
    pub fn new_side(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter(|l| l.on_new_side()).map(DiffLine::text)
    }

    /// `@@ -a,b +c,d @@` header
    #[must_use]
    pub fn header(&self) -> String {
        format!(
            "@@ -{} +{} @@",
            unified_range(self.old_start, self.old_len()),
            unified_range(self.new_start, self.new_len())
        )
    }
}

fn unified_range(start: usize, len: usize) -> String {
    let first = if len == 0 { start } else { start + 1 };
    format!("{first},{len}")
}

/// Why an accepted hunk was not applied at commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaleHunk {
    /// Hunk index in the block
    pub index: usize,
    /// Zero-based old line the hunk expected to find its old side at
    pub old_start: usize,
}

/// Text produced by a commit, with what happened to each hunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResult {
    /// Resulting text
    pub text: String,
    /// Accepted hunks that were applied
    pub applied: Vec<usize>,
    /// Accepted hunks whose old side no longer matched the live text
    pub stale: Vec<StaleHunk>,
    /// Hunks left pending and therefore not applied
    pub pending: Vec<usize>,
}

impl CommitResult {
    /// Whether every accepted hunk was applied
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.stale.is_empty()
    }
}

/// One file's hunks and their review state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffBlock {
    path: String,
    original_hash: ContentHash,
    #[serde(skip)]
    original: Vec<String>,
    hunks: Vec<DiffHunk>,
    status: Vec<HunkStatus>,
}

impl DiffBlock {
    /// Label the block with the path it belongs to
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Path shown in the `---`/`+++` headers
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Hash of the text the diff was computed from
    #[inline]
    #[must_use]
    pub fn original_hash(&self) -> &ContentHash {
        &self.original_hash
    }

    /// Hunks in order
    #[inline]
    #[must_use]
    pub fn hunks(&self) -> &[DiffHunk] {
        &self.hunks
    }

    /// Review state of each hunk
    #[inline]
    #[must_use]
    pub fn statuses(&self) -> &[HunkStatus] {
        &self.status
    }

    /// Whether the texts were identical
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Number of hunks still pending
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.status
            .iter()
            .filter(|s| **s == HunkStatus::Pending)
            .count()
    }

    /// Set the state of one hunk
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::UnknownHunk`] if `index` is out of range.
    pub fn set_status(&mut self, index: usize, status: HunkStatus) -> Result<(), ReviewError> {
        let len = self.status.len();
        let slot = self
            .status
            .get_mut(index)
            .ok_or(ReviewError::UnknownHunk { index, len })?;
        *slot = status;
        Ok(())
    }

    /// Accept one hunk
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::UnknownHunk`] if `index` is out of range.
    pub fn accept(&mut self, index: usize) -> Result<(), ReviewError> {
        self.set_status(index, HunkStatus::Accepted)
    }

    /// Reject one hunk
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::UnknownHunk`] if `index` is out of range.
    pub fn reject(&mut self, index: usize) -> Result<(), ReviewError> {
        self.set_status(index, HunkStatus::Rejected)
    }

    /// Accept every hunk
    pub fn accept_all(&mut self) {
        self.status.fill(HunkStatus::Accepted);
    }

    /// Reject every hunk
    pub fn reject_all(&mut self) {
        self.status.fill(HunkStatus::Rejected);
    }

    /// Rebuild the text from the original, taking the new side of accepted
    /// hunks and the old side of everything else
    #[must_use]
    pub fn apply_accepted(&self) -> String {
        let mut out = String::new();
        let mut cursor = 0;
        for (hunk, status) in self.hunks.iter().zip(&self.status) {
            push_lines(&mut out, &self.original[cursor..hunk.old_start]);
            if *status == HunkStatus::Accepted {
                hunk.new_side().for_each(|line| out.push_str(line));
            } else {
                hunk.old_side().for_each(|line| out.push_str(line));
            }
            cursor = hunk.old_start + hunk.old_len();
        }
        push_lines(&mut out, &self.original[cursor..]);
        out
    }

    /// Apply accepted hunks to `current`, re-validating each against it
    ///
    /// An accepted hunk is applied only if its old side is still found at
    /// its recorded position in `current`; otherwise it is reported stale
    /// and that region of `current` is kept. Pending hunks are never applied.
    #[must_use]
    pub fn apply_accepted_to(&self, current: &str) -> CommitResult {
        let live = split_keep_newlines(current);
        let unchanged = ContentHash::of_text(current) == self.original_hash;
        let mut result = CommitResult {
            text: String::with_capacity(current.len()),
            applied: Vec::new(),
            stale: Vec::new(),
            pending: Vec::new(),
        };
        let mut cursor = 0;

        for (index, (hunk, status)) in self.hunks.iter().zip(&self.status).enumerate() {
            match status {
                HunkStatus::Pending => {
                    result.pending.push(index);
                    continue;
                }
                HunkStatus::Rejected => continue,
                HunkStatus::Accepted => {}
            }

            let end = hunk.old_start + hunk.old_len();
            let still_valid = cursor <= hunk.old_start
                && (unchanged
                    || (end <= live.len()
                        && live[hunk.old_start..end]
                            .iter()
                            .map(String::as_str)
                            .eq(hunk.old_side())));
            if !still_valid {
                warn!(path = %self.path, hunk = index, "skipping stale hunk");
                result.stale.push(StaleHunk {
                    index,
                    old_start: hunk.old_start,
                });
                continue;
            }

            push_lines(&mut result.text, &live[cursor..hunk.old_start]);
            hunk.new_side().for_each(|line| result.text.push_str(line));
            cursor = end;
            result.applied.push(index);
        }
        push_lines(&mut result.text, &live[cursor.min(live.len())..]);

        debug!(
            path = %self.path,
            applied = result.applied.len(),
            stale = result.stale.len(),
            pending = result.pending.len(),
            "committed diff block"
        );
        result
    }

    /// Unified diff text with `---`/`+++` headers
    #[must_use]
    pub fn render_unified(&self) -> String {
        if self.hunks.is_empty() {
            return String::new();
        }
        let mut out = format!("--- a/{path}\n+++ b/{path}\n", path = self.path);
        for hunk in &self.hunks {
            out.push_str(&hunk.header());
            out.push('\n');
            for line in &hunk.lines {
                out.push(line.prefix());
                match line.text().strip_suffix('\n') {
                    Some(content) => {
                        out.push_str(content);
                        out.push('\n');
                    }
                    None => {
                        out.push_str(line.text());
                        out.push_str("\n\\ No newline at end of file\n");
                    }
                }
            }
        }
        out
    }
}

fn push_lines(out: &mut String, lines: &[String]) {
    lines.iter().for_each(|line| out.push_str(line));
}

fn split_keep_newlines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// Computes [`DiffBlock`]s
#[derive(Debug, Clone, Copy)]
pub struct DiffEngine {
    context: usize,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffEngine {
    /// Engine with the default context window
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            context: DEFAULT_CONTEXT,
        }
    }

    /// Use a different context window
    #[inline]
    #[must_use]
    pub fn with_context(mut self, context: usize) -> Self {
        self.context = context;
        self
    }

    /// Context window in lines
    #[inline]
    #[must_use]
    pub fn context(&self) -> usize {
        self.context
    }

    /// Diff two texts; every hunk starts pending
    #[must_use]
    pub fn diff(&self, original: &str, proposed: &str) -> DiffBlock {
        let mut options = DiffOptions::new();
        options.set_context_len(self.context);
        let patch = options.create_patch(original, proposed);

        let mut hunks = Vec::new();
        for hunk in patch.hunks() {
            let old = hunk.old_range();
            let new = hunk.new_range();
            let raw = DiffHunk {
                old_start: zero_based(old.start(), old.len()),
                new_start: zero_based(new.start(), new.len()),
                lines: hunk
                    .lines()
                    .iter()
                    .map(|line| match line {
                        Line::Context(text) => DiffLine::Context((*text).to_string()),
                        Line::Delete(text) => DiffLine::Removed((*text).to_string()),
                        Line::Insert(text) => DiffLine::Added((*text).to_string()),
                    })
                    .collect(),
            };
            split_hunk(raw, self.context, &mut hunks);
        }

        debug!(hunks = hunks.len(), context = self.context, "computed diff");
        DiffBlock {
            path: String::from("document"),
            original_hash: ContentHash::of_text(original),
            original: split_keep_newlines(original),
            status: vec![HunkStatus::Pending; hunks.len()],
            hunks,
        }
    }
}

// Unified ranges are one-based, except an empty range names the line before it.
fn zero_based(start: usize, len: usize) -> usize {
    if len == 0 {
        start
    } else {
        start.saturating_sub(1)
    }
}

/// Split a hunk at interior unchanged runs longer than `context`.
///
/// The earlier piece keeps up to `context` trailing lines of the run and the
/// later piece takes up to `context` leading lines from what remains, so the
/// pieces never overlap.
fn split_hunk(hunk: DiffHunk, context: usize, out: &mut Vec<DiffHunk>) {
    let mut old_at = hunk.old_start;
    let mut new_at = hunk.new_start;
    let mut current = DiffHunk {
        old_start: old_at,
        new_start: new_at,
        lines: Vec::new(),
    };
    let mut lines = hunk.lines.into_iter().peekable();

    while let Some(line) = lines.next() {
        if !matches!(line, DiffLine::Context(_)) || current.lines.is_empty() {
            advance(&line, &mut old_at, &mut new_at);
            current.lines.push(line);
            continue;
        }

        let mut run = vec![line];
        while let Some(DiffLine::Context(_)) = lines.peek() {
            if let Some(next) = lines.next() {
                run.push(next);
            }
        }
        let interior = lines.peek().is_some();
        let has_change = current
            .lines
            .iter()
            .any(|l| !matches!(l, DiffLine::Context(_)));

        if !interior || run.len() <= context || !has_change {
            for line in run {
                advance(&line, &mut old_at, &mut new_at);
                current.lines.push(line);
            }
            continue;
        }

        let trailing = context.min(run.len());
        let leading = context.min(run.len() - trailing);
        let skipped = run.len() - trailing - leading;
        let mut run = run.into_iter();
        for line in run.by_ref().take(trailing) {
            advance(&line, &mut old_at, &mut new_at);
            current.lines.push(line);
        }
        out.push(std::mem::replace(
            &mut current,
            DiffHunk {
                old_start: old_at + skipped,
                new_start: new_at + skipped,
                lines: Vec::new(),
            },
        ));
        old_at += skipped;
        new_at += skipped;
        for line in run.skip(skipped) {
            advance(&line, &mut old_at, &mut new_at);
            current.lines.push(line);
        }
    }

    if current.lines.iter().any(|l| !matches!(l, DiffLine::Context(_))) {
        out.push(current);
    }
}

fn advance(line: &DiffLine, old_at: &mut usize, new_at: &mut usize) {
    if line.on_old_side() {
        *old_at += 1;
    }
    if line.on_new_side() {
        *new_at += 1;
    }
}
