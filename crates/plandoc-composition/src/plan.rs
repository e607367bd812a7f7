//! Insertion plans
//!
//! An [`InsertionPlan`] is a list of line-range directives computed against
//! one document text. Line numbers refer to that original text; the applier
//! never renumbers them.

use crate::proposal::ProposalId;
use crate::selection::PlacementSelection;
use plandoc_artifact::{ContentHash, Fingerprint, ProvenanceMarker, SectionName, TaskLine};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Links a deletion to the insertion it must travel with
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MoveGroup(pub usize);

impl Display for MoveGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "move#{}", self.0)
    }
}

/// One task line to insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedLine {
    /// Proposal the line came from
    pub source_proposal_id: ProposalId,
    /// Task to render (its provenance is stamped at apply time)
    pub task: TaskLine,
    /// Origin stamped on the line
    pub provenance: ProvenanceMarker,
    /// Deletion this line replaces, for moves
    pub move_group: Option<MoveGroup>,
}

impl PlannedLine {
    /// Render with a fresh marker
    #[must_use]
    pub fn render(&self) -> String {
        self.task
            .clone()
            .with_provenance(Some(self.provenance.clone()))
            .render()
    }
}

/// A single line-range operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Directive {
    /// Insert lines before `line` (or at end of file when `line == len`)
    #[serde(rename_all = "camelCase")]
    Insert {
        /// Insertion point in the original text
        line: usize,
        /// Destination section
        section: SectionName,
        /// Lines in input order
        lines: Vec<PlannedLine>,
    },
    /// Delete `start..end`, verified against a fingerprint first
    #[serde(rename_all = "camelCase")]
    Delete {
        /// First deleted line
        start: usize,
        /// One past the last deleted line
        end: usize,
        /// Expected content of the range
        fingerprint: Fingerprint,
        /// Insertion this deletion travels with
        move_group: Option<MoveGroup>,
    },
    /// Append a new section at end of file
    #[serde(rename_all = "camelCase")]
    CreateSection {
        /// End of the original text
        line: usize,
        /// Section name
        name: SectionName,
        /// Heading level
        level: u8,
        /// Write a blank separator line before the heading
        blank_before: bool,
        /// Lines in input order
        lines: Vec<PlannedLine>,
    },
}

impl Directive {
    /// Line the directive is anchored at in the original text
    #[must_use]
    pub fn anchor(&self) -> usize {
        match self {
            Self::Insert { line, .. } | Self::CreateSection { line, .. } => *line,
            Self::Delete { start, .. } => *start,
        }
    }

    /// Whether this is a deletion
    #[inline]
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }

    /// Lines this directive inserts
    #[must_use]
    pub fn planned_lines(&self) -> &[PlannedLine] {
        match self {
            Self::Insert { lines, .. } | Self::CreateSection { lines, .. } => lines,
            Self::Delete { .. } => &[],
        }
    }
}

impl Display for Directive {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert {
                line,
                section,
                lines,
            } => write!(f, "insert {} line(s) into '{section}' at {line}", lines.len()),
            Self::Delete {
                start,
                end,
                move_group,
                ..
            } => {
                write!(f, "delete lines {start}..{end}")?;
                if let Some(group) = move_group {
                    write!(f, " ({group})")?;
                }
                Ok(())
            }
            Self::CreateSection { name, lines, .. } => {
                write!(f, "create section '{name}' with {} line(s)", lines.len())
            }
        }
    }
}

/// Why a selection produced no directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum SkipReason {
    /// Reviewer discarded it
    Discarded,
    /// The destination already holds an item with this text
    AlreadyPlaced,
    /// An earlier selection in the batch placed the same text there
    DuplicateInBatch,
}

/// A selection that produced no directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedSelection {
    /// The selection
    pub selection: PlacementSelection,
    /// Why
    pub reason: SkipReason,
}

/// Directives computed against one document text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertionPlan {
    /// Hash of the text the plan was computed from
    pub base_hash: ContentHash,
    /// Directives in plan order (deletions, insertions, new sections)
    pub directives: Vec<Directive>,
    /// Selections that needed no change
    pub skipped: Vec<SkippedSelection>,
    /// Destinations absent from the document, in creation order
    pub synthesized_sections: Vec<SectionName>,
}

impl InsertionPlan {
    /// Empty plan for a text
    #[must_use]
    pub fn empty(base_hash: ContentHash) -> Self {
        Self {
            base_hash,
            directives: Vec::new(),
            skipped: Vec::new(),
            synthesized_sections: Vec::new(),
        }
    }

    /// Whether the plan changes nothing
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.directives.is_empty()
    }

    /// Number of task lines the plan inserts
    #[must_use]
    pub fn inserted_line_count(&self) -> usize {
        self.directives
            .iter()
            .map(|d| d.planned_lines().len())
            .sum()
    }

    /// Number of deletions
    #[must_use]
    pub fn delete_count(&self) -> usize {
        self.directives.iter().filter(|d| d.is_delete()).count()
    }
}
