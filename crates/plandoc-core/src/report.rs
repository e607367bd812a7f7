//! Reconcile reports
//!
//! Everything a batch run recovered from, in one serializable value: the
//! proposals suppressed as already applied, those dropped as malformed, the
//! selections that needed no change, and the applier's partial failures.

use plandoc_artifact::{ContentHash, ParseDiagnostic, SectionName};
use plandoc_composition::{
    ApplyReport, InsertionPlan, ProposalId, RejectedProposal, SkipReason, SkippedSelection,
};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// A proposal whose origin is already recorded in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressedProposal {
    /// Proposal id
    pub proposal_id: ProposalId,
    /// Section holding the earlier item
    pub section: SectionName,
    /// Zero-based line of the earlier item
    pub line_number: usize,
}

/// A proposal dropped as malformed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    /// Proposal id, or `#<index>` when the producer gave none
    pub proposal_id: ProposalId,
    /// Why it was dropped
    pub reason: String,
}

impl From<RejectedProposal> for Rejection {
    fn from(rejected: RejectedProposal) -> Self {
        Self {
            proposal_id: rejected.id,
            reason: rejected.reason.to_string(),
        }
    }
}

/// Outcome of one batch against one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Hash of the input text
    pub base_hash: ContentHash,
    /// Hash of the output text
    pub result_hash: ContentHash,
    /// Proposals already represented in the document
    pub suppressed: Vec<SuppressedProposal>,
    /// Malformed proposals
    pub rejected: Vec<Rejection>,
    /// Selections that produced no directive
    pub skipped: Vec<SkippedSelection>,
    /// Sections appended because no heading matched
    pub synthesized_sections: Vec<SectionName>,
    /// Lines the parser could not classify
    pub diagnostics: Vec<ParseDiagnostic>,
    /// What the applier did
    pub apply: ApplyReport,
}

impl ReconcileReport {
    pub(crate) fn new(base_hash: ContentHash, plan: &InsertionPlan) -> Self {
        Self {
            base_hash,
            result_hash: base_hash,
            suppressed: Vec::new(),
            rejected: Vec::new(),
            skipped: plan.skipped.clone(),
            synthesized_sections: plan.synthesized_sections.clone(),
            diagnostics: Vec::new(),
            apply: ApplyReport::default(),
        }
    }

    /// Record proposals that were rejected before reaching the engine
    pub fn record_rejections<I>(&mut self, rejected: I)
    where
        I: IntoIterator<Item = RejectedProposal>,
    {
        self.rejected.extend(rejected.into_iter().map(Rejection::from));
    }

    /// Whether the text changed
    #[inline]
    #[must_use]
    pub fn changed(&self) -> bool {
        self.base_hash != self.result_hash
    }

    /// Whether every directive applied
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.apply.is_complete()
    }

    /// Number of discarded selections
    #[must_use]
    pub fn discarded_count(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| s.reason == SkipReason::Discarded)
            .count()
    }
}

impl Display for ReconcileReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} deleted, {} suppressed, {} rejected, {} skipped",
            self.apply.inserted_lines,
            self.apply.deleted_lines,
            self.suppressed.len(),
            self.rejected.len(),
            self.skipped.len()
        )?;
        if !self.synthesized_sections.is_empty() {
            write!(f, ", {} section(s) created", self.synthesized_sections.len())?;
        }
        if !self.apply.skipped.is_empty() {
            write!(f, ", {} directive(s) not applied", self.apply.skipped.len())?;
        }
        Ok(())
    }
}
