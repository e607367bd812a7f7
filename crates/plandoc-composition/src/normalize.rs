//! Proposal normalization
//!
//! Converts producer proposals into [`PlacementSelection`]s. One proposal
//! yields one selection, except for explicit fan-out: completed-task groups
//! yield one selection per member, and `also_keep_in` adds a selection for
//! the secondary section. Discarded proposals stay in the output, flagged,
//! so they remain traceable.

use crate::proposal::{ChangeProposal, Destination, ProducerKind, ProposalId, RejectedProposal};
use crate::selection::PlacementSelection;
use plandoc_artifact::SliceReference;
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::debug;

/// Reviewer adjustment applied before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposalOverride {
    destination: Option<Destination>,
    slice_link: Option<Option<SliceReference>>,
    text: Option<String>,
}

impl ProposalOverride {
    /// Empty override
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the destination
    #[inline]
    #[must_use]
    pub fn destination(mut self, destination: Destination) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Replace (or with `None`, remove) the slice link
    #[inline]
    #[must_use]
    pub fn slice_link(mut self, link: Option<SliceReference>) -> Self {
        self.slice_link = Some(link);
        self
    }

    /// Replace the text
    #[inline]
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    fn apply(&self, proposal: &mut ChangeProposal) {
        if let Some(destination) = &self.destination {
            proposal.suggested_destination = destination.clone();
        }
        if let Some(link) = &self.slice_link {
            proposal.suggested_slice_link = link.clone();
        }
        if let Some(text) = &self.text {
            proposal.text = text.clone();
        }
    }
}

/// Result of normalizing a batch
#[derive(Debug, Default)]
pub struct NormalizeOutcome {
    /// Selections in input order
    pub selections: Vec<PlacementSelection>,
    /// Proposals dropped as malformed
    pub rejected: Vec<RejectedProposal>,
}

/// Converts proposals into placement selections
#[derive(Debug, Clone, Default)]
pub struct ProposalNormalizer {
    overrides: HashMap<ProposalId, ProposalOverride>,
}

impl ProposalNormalizer {
    /// Normalizer without overrides
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reviewer override for one proposal
    #[must_use]
    pub fn with_override(mut self, id: ProposalId, adjustment: ProposalOverride) -> Self {
        self.overrides.insert(id, adjustment);
        self
    }

    /// Register a reviewer override in place
    pub fn set_override(&mut self, id: ProposalId, adjustment: ProposalOverride) {
        self.overrides.insert(id, adjustment);
    }

    /// Proposal as it looks after its override
    #[must_use]
    pub fn effective<'a>(&self, proposal: &'a ChangeProposal) -> Cow<'a, ChangeProposal> {
        match self.overrides.get(&proposal.id) {
            Some(adjustment) => {
                let mut adjusted = proposal.clone();
                adjustment.apply(&mut adjusted);
                Cow::Owned(adjusted)
            }
            None => Cow::Borrowed(proposal),
        }
    }

    /// Normalize a batch, preserving input order
    #[must_use]
    pub fn normalize(&self, proposals: &[ChangeProposal]) -> NormalizeOutcome {
        let mut outcome = NormalizeOutcome::default();

        for proposal in proposals {
            let proposal = self.effective(proposal);
            if let Err(reason) = proposal.validate() {
                debug!(id = %proposal.id, %reason, "dropping malformed proposal");
                outcome.rejected.push(RejectedProposal {
                    id: proposal.id.clone(),
                    reason,
                });
                continue;
            }
            Self::expand(&proposal, &mut outcome.selections);
        }

        debug!(
            proposals = proposals.len(),
            selections = outcome.selections.len(),
            rejected = outcome.rejected.len(),
            "normalized proposals"
        );
        outcome
    }

    fn expand(proposal: &ChangeProposal, out: &mut Vec<PlacementSelection>) {
        let marker = proposal.origin();
        let Destination::Section(destination) = &proposal.suggested_destination else {
            out.push(
                PlacementSelection::new(
                    proposal.id.clone(),
                    proposal.text.clone(),
                    Destination::Discard,
                    marker,
                )
                .with_slice_link(proposal.suggested_slice_link.clone()),
            );
            return;
        };

        let is_group = matches!(proposal.kind, ProducerKind::CompletedTaskGroup { .. });
        let keep_copy = proposal
            .also_keep_in
            .as_ref()
            .filter(|extra| *extra != destination);

        for text in proposal.item_texts() {
            let relocate = if is_group {
                Some(text)
            } else if proposal.is_move() {
                proposal.existing_similar.as_deref()
            } else {
                None
            };

            let mut main = PlacementSelection::new(
                proposal.id.clone(),
                text,
                Destination::Section(destination.clone()),
                marker.clone(),
            )
            .with_slice_link(proposal.suggested_slice_link.clone());
            if proposal.kind.marks_done() {
                main = main.with_checked(true);
            }
            if let (Some(existing), None) = (relocate, keep_copy) {
                main = main.relocating(existing);
            }
            out.push(main);

            if let Some(extra) = keep_copy {
                out.push(
                    PlacementSelection::new(
                        proposal.id.clone(),
                        text,
                        Destination::Section(extra.clone()),
                        marker.clone(),
                    )
                    .with_slice_link(proposal.suggested_slice_link.clone()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use plandoc_artifact::SectionName;

    fn dest(name: &str) -> Destination {
        Destination::section(name).unwrap()
    }

    #[test]
    fn one_to_one_in_input_order() {
        let proposals = vec![
            ChangeProposal::harvested("A", "Log.md", NaiveDate::from_ymd_opt(2024, 1, 1), dest("Current")),
            ChangeProposal::groomed("B", "Ideas.md", Some("UI"), dest("Later")),
        ];
        let outcome = ProposalNormalizer::new().normalize(&proposals);
        let texts: Vec<_> = outcome.selections.iter().map(|s| s.final_text.as_str()).collect();
        assert_eq!(texts, vec!["A", "B"]);
        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.selections[1].provenance.source_context.as_deref(), Some("UI"));
        assert_eq!(outcome.selections[0].checked, None);
        assert_eq!(outcome.selections[0].relocate_from, None);
    }

    #[test]
    fn discard_is_kept_and_flagged() {
        let proposals = vec![ChangeProposal::harvested("Noise", "Log.md", None, Destination::Discard)];
        let outcome = ProposalNormalizer::new().normalize(&proposals);
        assert_eq!(outcome.selections.len(), 1);
        assert!(outcome.selections[0].is_discard());
        assert!(outcome.selections[0].destination_section().is_none());
    }

    #[test]
    fn override_changes_text_destination_and_link() {
        let proposal = ChangeProposal::harvested("Draft", "Log.md", None, dest("Later"))
            .with_slice_link(SliceReference::new("M1", "S1", ""));
        let normalizer = ProposalNormalizer::new().with_override(
            proposal.id.clone(),
            ProposalOverride::new()
                .text("Write draft")
                .destination(dest("Current"))
                .slice_link(None),
        );
        let outcome = normalizer.normalize(&[proposal]);
        let selection = &outcome.selections[0];
        assert_eq!(selection.final_text, "Write draft");
        assert_eq!(selection.destination, dest("Current"));
        assert!(selection.slice_link.is_none());
    }

    #[test]
    fn override_to_discard() {
        let proposal = ChangeProposal::harvested("Maybe", "Log.md", None, dest("Later"));
        let mut normalizer = ProposalNormalizer::new();
        normalizer.set_override(
            proposal.id.clone(),
            ProposalOverride::new().destination(Destination::Discard),
        );
        assert!(normalizer.normalize(&[proposal]).selections[0].is_discard());
    }

    #[test]
    fn malformed_proposal_is_rejected_rest_proceeds() {
        let good = ChangeProposal::harvested("Good", "Log.md", None, dest("Current"));
        let bad = ChangeProposal::harvested("  ", "Log.md", None, dest("Current"));
        let outcome = ProposalNormalizer::new().normalize(&[bad, good]);
        assert_eq!(outcome.selections.len(), 1);
        assert_eq!(outcome.rejected.len(), 1);
        assert!(outcome.rejected[0].reason.is_missing_field());
    }

    #[test]
    fn commit_match_moves_and_checks() {
        let proposal = ChangeProposal::commit_match("Ship v1", "git", "abc123", dest("Done"));
        let selection = &ProposalNormalizer::new().normalize(&[proposal]).selections[0];
        assert_eq!(selection.relocate_from.as_deref(), Some("Ship v1"));
        assert_eq!(selection.checked, Some(true));
        assert_eq!(selection.provenance.source_context.as_deref(), Some("abc123"));
    }

    #[test]
    fn completed_group_fans_out_per_item() {
        let proposal = ChangeProposal::completed_group("Sprint 3", "Current.md", ["A", "B"], dest("Archive"));
        let outcome = ProposalNormalizer::new().normalize(&[proposal.clone()]);
        assert_eq!(outcome.selections.len(), 2);
        for (selection, text) in outcome.selections.iter().zip(["A", "B"]) {
            assert_eq!(selection.source_proposal_id, proposal.id);
            assert_eq!(selection.relocate_from.as_deref(), Some(text));
            assert_eq!(selection.checked, Some(true));
        }
    }

    #[test]
    fn also_keep_in_fans_out_as_copy() {
        let proposal = ChangeProposal::groomed("Ship v1", "Roadmap.md", None, dest("Current"))
            .promoting("Ship v1")
            .also_keep_in(SectionName::new("Later").unwrap());
        let outcome = ProposalNormalizer::new().normalize(&[proposal.clone()]);
        assert_eq!(outcome.selections.len(), 2);
        assert!(outcome.selections.iter().all(|s| s.source_proposal_id == proposal.id));
        assert!(outcome.selections.iter().all(|s| s.relocate_from.is_none()));
        assert_eq!(outcome.selections[1].destination, dest("Later"));
    }

    #[test]
    fn promotion_without_copy_relocates() {
        let proposal = ChangeProposal::groomed("Ship v1", "Roadmap.md", None, dest("Current"))
            .promoting("Ship v1");
        let selection = &ProposalNormalizer::new().normalize(&[proposal]).selections[0];
        assert_eq!(selection.relocate_from.as_deref(), Some("Ship v1"));
        assert_eq!(selection.checked, None);
    }
}
