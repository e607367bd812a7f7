//! Reconciler: the full pipeline over one document text
//!
//! ```text
//! parse -> suppress already-applied -> normalize -> resolve -> apply
//! ```
//!
//! Every stage is a pure function of its inputs; the reconciler does no I/O.
//! [`DocumentStore`](crate::DocumentStore) adds the read-modify-write around it.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::report::{ReconcileReport, SuppressedProposal};
use plandoc_artifact::{ContentHash, Document, SectionName};
use plandoc_composition::{
    ChangeProposal, HistoryEntry, InsertionPlan, PatchApplier, PlacementResolver,
    ProposalNormalizer, ProvenanceTracker,
};
use plandoc_parser::DocumentParser;
use plandoc_review::{DiffBlock, DiffEngine};
use std::borrow::Cow;
use tracing::{debug, info};

/// Result of running a batch against one text
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Patched text
    pub text: String,
    /// Plan that produced it
    pub plan: InsertionPlan,
    /// What happened
    pub report: ReconcileReport,
}

/// Runs proposal batches against document text
#[derive(Debug, Clone)]
pub struct Reconciler {
    config: EngineConfig,
    parser: DocumentParser,
    tracker: ProvenanceTracker,
    resolver: PlacementResolver,
    applier: PatchApplier,
    diff: DiffEngine,
}

impl Reconciler {
    /// Build the pipeline from a configuration
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is out of range or its vocabulary
    /// is invalid.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let parser = DocumentParser::new(config.vocabulary()?);
        Ok(Self {
            resolver: config.resolver(),
            diff: config.diff_engine(),
            parser,
            tracker: ProvenanceTracker::new(),
            applier: PatchApplier::new(),
            config,
        })
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parser with the configured vocabulary
    #[inline]
    #[must_use]
    pub fn parser(&self) -> &DocumentParser {
        &self.parser
    }

    /// Diff engine used for previews
    #[inline]
    #[must_use]
    pub fn diff_engine(&self) -> &DiffEngine {
        &self.diff
    }

    /// Parser that also recognizes every destination named by the batch
    ///
    /// Sections synthesized by an earlier run carry names outside the
    /// configured vocabulary; without this they would parse as free text and
    /// the items inside them would be invisible to suppression.
    #[must_use]
    pub fn parser_for(
        &self,
        proposals: &[ChangeProposal],
        normalizer: &ProposalNormalizer,
    ) -> Cow<'_, DocumentParser> {
        let vocabulary = self.parser.vocabulary();
        let mut missing: Vec<SectionName> = Vec::new();
        for proposal in proposals {
            let proposal = normalizer.effective(proposal);
            let names = proposal
                .suggested_destination
                .section_name()
                .into_iter()
                .chain(proposal.also_keep_in.as_ref());
            for name in names {
                if !vocabulary.is_task_section(name) && !missing.contains(name) {
                    missing.push(name.clone());
                }
            }
        }

        if missing.is_empty() {
            return Cow::Borrowed(&self.parser);
        }
        debug!(extra = missing.len(), "extending vocabulary with batch destinations");
        let extended = missing
            .into_iter()
            .fold(vocabulary.clone(), |vocab, name| vocab.with_task_section(name));
        Cow::Owned(DocumentParser::new(extended))
    }

    /// Run a batch against `text`
    #[must_use]
    pub fn reconcile(
        &self,
        text: &str,
        proposals: &[ChangeProposal],
        normalizer: &ProposalNormalizer,
    ) -> Reconciliation {
        let doc = self.parser_for(proposals, normalizer).parse(text);
        self.reconcile_document(&doc, text, proposals, normalizer)
    }

    /// Run a batch against an already parsed document
    ///
    /// `doc` must be the parse of `text` by [`Self::parser_for`] the same batch.
    #[must_use]
    pub fn reconcile_document(
        &self,
        doc: &Document,
        text: &str,
        proposals: &[ChangeProposal],
        normalizer: &ProposalNormalizer,
    ) -> Reconciliation {
        let mut suppressed = Vec::new();
        let mut pending = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            let effective = normalizer.effective(proposal);
            match self.tracker.find_existing(doc, &effective) {
                Some((section, item)) => {
                    debug!(id = %proposal.id, section = %section, "proposal already applied");
                    suppressed.push(SuppressedProposal {
                        proposal_id: proposal.id.clone(),
                        section: section.clone(),
                        line_number: item.line_number,
                    });
                }
                None => {
                    let placed = self.tracker.applied_items(doc, &effective);
                    if placed.is_empty() {
                        pending.push(proposal.clone());
                    } else {
                        debug!(id = %proposal.id, placed = placed.len(), "group partly applied");
                        pending.push(proposal.without_items(&placed));
                    }
                }
            }
        }

        let outcome = normalizer.normalize(&pending);
        let plan = self.resolver.resolve(doc, &outcome.selections);
        let applied = self.applier.apply(text, &plan);

        let mut report = ReconcileReport::new(*doc.hash(), &plan);
        report.result_hash = ContentHash::of_text(&applied.text);
        report.suppressed = suppressed;
        report.record_rejections(outcome.rejected);
        report.diagnostics = doc.diagnostics().to_vec();
        report.apply = applied.report;

        info!(
            proposals = proposals.len(),
            suppressed = report.suppressed.len(),
            rejected = report.rejected.len(),
            inserted = report.apply.inserted_lines,
            deleted = report.apply.deleted_lines,
            "reconciled batch"
        );
        Reconciliation {
            text: applied.text,
            plan,
            report,
        }
    }

    /// Diff preview of a batch; nothing is applied
    #[must_use]
    pub fn preview(
        &self,
        path: &str,
        text: &str,
        proposals: &[ChangeProposal],
        normalizer: &ProposalNormalizer,
    ) -> (DiffBlock, Reconciliation) {
        let reconciliation = self.reconcile(text, proposals, normalizer);
        let block = self.diff.diff(text, &reconciliation.text).with_path(path);
        (block, reconciliation)
    }

    /// Where each proposal already lives, for a reopened review
    #[must_use]
    pub fn history(
        &self,
        text: &str,
        proposals: &[ChangeProposal],
        normalizer: &ProposalNormalizer,
    ) -> Vec<HistoryEntry> {
        let doc = self.parser_for(proposals, normalizer).parse(text);
        self.tracker.history(&doc, proposals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plandoc_composition::{Destination, ProposalOverride, SkipReason};
    use pretty_assertions::assert_eq;

    fn reconciler() -> Reconciler {
        Reconciler::new(EngineConfig::default()).unwrap()
    }

    fn dest(name: &str) -> Destination {
        Destination::section(name).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(Reconciler::new(EngineConfig::new().with_heading_level(0)).is_err());
    }

    #[test]
    fn inserts_at_end_of_section() {
        let text = "## Current\n- [ ] Existing\n\n## Later\n";
        let proposal = ChangeProposal::groomed("New idea", "Ideas.md", Some("UI"), dest("Current"));
        let result = reconciler().reconcile(text, &[proposal], &ProposalNormalizer::new());
        assert_eq!(
            result.text,
            "## Current\n- [ ] Existing\n- [ ] New idea <!-- from Ideas.md: UI -->\n\n## Later\n"
        );
        assert!(result.report.changed());
        assert!(result.report.is_complete());
    }

    #[test]
    fn second_run_is_suppressed() {
        let text = "## Current\n";
        let proposal = ChangeProposal::groomed("New idea", "Ideas.md", Some("UI"), dest("Current"));
        let reconciler = reconciler();
        let first = reconciler.reconcile(text, &[proposal.clone()], &ProposalNormalizer::new());
        let second = reconciler.reconcile(&first.text, &[proposal], &ProposalNormalizer::new());
        assert_eq!(second.text, first.text);
        assert_eq!(second.report.suppressed.len(), 1);
        assert!(!second.report.changed());
    }

    #[test]
    fn synthesized_section_is_recognized_next_time() {
        let proposal = ChangeProposal::groomed("Read paper", "Ideas.md", Some("ML"), dest("Research"));
        let reconciler = reconciler();
        let first = reconciler.reconcile("## Current\n", &[proposal.clone()], &ProposalNormalizer::new());
        assert_eq!(
            first.text,
            "## Current\n\n## Research\n- [ ] Read paper <!-- from Ideas.md: ML -->\n"
        );
        assert_eq!(first.report.synthesized_sections.len(), 1);

        let second = reconciler.reconcile(&first.text, &[proposal], &ProposalNormalizer::new());
        assert_eq!(second.text, first.text);
    }

    #[test]
    fn override_applies_before_suppression_check() {
        let proposal = ChangeProposal::groomed("Tidy", "Ideas.md", Some("Misc"), dest("Later"));
        let normalizer = ProposalNormalizer::new().with_override(
            proposal.id.clone(),
            ProposalOverride::new().destination(Destination::Discard),
        );
        let result = reconciler().reconcile("## Later\n", &[proposal], &normalizer);
        assert_eq!(result.text, "## Later\n");
        assert_eq!(result.report.discarded_count(), 1);
        assert_eq!(result.report.skipped[0].reason, SkipReason::Discarded);
    }

    #[test]
    fn preview_does_not_apply() {
        let text = "## Current\n";
        let proposal = ChangeProposal::groomed("Draft", "Ideas.md", None, dest("Current"));
        let (block, reconciliation) =
            reconciler().preview("Tasks.md", text, &[proposal], &ProposalNormalizer::new());
        assert_eq!(block.hunks().len(), 1);
        assert_eq!(block.apply_accepted(), text);
        assert!(block.render_unified().starts_with("--- a/Tasks.md\n"));
        assert_ne!(reconciliation.text, text);
    }

    #[test]
    fn history_marks_applied_proposals() {
        let applied = ChangeProposal::groomed("Draft", "Ideas.md", Some("Docs"), dest("Current"));
        let fresh = ChangeProposal::groomed("Other", "Ideas.md", Some("Misc"), dest("Current"));
        let text = "## Current\n- [ ] Draft <!-- from Ideas.md: Docs -->\n";
        let history = reconciler().history(text, &[applied, fresh], &ProposalNormalizer::new());
        assert!(history[0].is_applied());
        assert_eq!(history[0].line_number, Some(1));
        assert!(!history[1].is_applied());
    }
}
