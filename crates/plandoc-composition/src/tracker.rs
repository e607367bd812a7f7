//! Provenance tracking
//!
//! Read-only queries over the provenance markers of a parsed document. A
//! marker's `(source_file, source_context)` pair is the only record that an
//! origin was already applied.

use crate::proposal::{ChangeProposal, ProposalId};
use plandoc_artifact::{normalize_text, Document, ProvenanceMarker, SectionName, TaskItem};
use serde::Serialize;

/// Where an already-applied proposal lives now
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Proposal id
    pub proposal_id: ProposalId,
    /// Section holding the item, if it was applied
    pub section: Option<SectionName>,
    /// Zero-based line of the item
    pub line_number: Option<usize>,
    /// Current checkbox state
    pub checked: Option<bool>,
}

impl HistoryEntry {
    /// Whether the proposal is already represented in the document
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.section.is_some()
    }
}

/// Finds items that already carry a proposal's origin
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvenanceTracker;

impl ProvenanceTracker {
    /// Create a tracker
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// First item whose marker records the proposal's origin
    ///
    /// Matching is on `(source_file, source_context)`. When the proposal has
    /// no context the item text must match too, since the file alone does
    /// not identify an origin. A multi-item proposal is found only once every
    /// member carries its origin.
    #[must_use]
    pub fn find_existing<'d>(
        &self,
        doc: &'d Document,
        proposal: &ChangeProposal,
    ) -> Option<(&'d SectionName, &'d TaskItem)> {
        let origin = proposal.origin();
        let texts = proposal.item_texts();
        if texts.len() > 1 {
            let mut first = None;
            for text in texts {
                let found = find_marked(doc, &origin, Some(text))?;
                first.get_or_insert(found);
            }
            return first;
        }

        let text = texts.first().copied().filter(|_| origin.source_context.is_none());
        find_marked(doc, &origin, text)
    }

    /// Members of a multi-item proposal that already carry its origin
    ///
    /// Empty for single-item proposals; those are handled whole by
    /// [`Self::find_existing`].
    #[must_use]
    pub fn applied_items<'p>(&self, doc: &Document, proposal: &'p ChangeProposal) -> Vec<&'p str> {
        let texts = proposal.item_texts();
        if texts.len() < 2 {
            return Vec::new();
        }
        let origin = proposal.origin();
        texts
            .into_iter()
            .filter(|text| find_marked(doc, &origin, Some(text)).is_some())
            .collect()
    }

    /// Whether the proposal is already represented in the document
    #[inline]
    #[must_use]
    pub fn is_applied(&self, doc: &Document, proposal: &ChangeProposal) -> bool {
        self.find_existing(doc, proposal).is_some()
    }

    /// Where each proposal already lives, for reopened review sessions
    #[must_use]
    pub fn history(&self, doc: &Document, proposals: &[ChangeProposal]) -> Vec<HistoryEntry> {
        proposals
            .iter()
            .map(|proposal| match self.find_existing(doc, proposal) {
                Some((section, item)) => HistoryEntry {
                    proposal_id: proposal.id.clone(),
                    section: Some(section.clone()),
                    line_number: Some(item.line_number),
                    checked: Some(item.checked),
                },
                None => HistoryEntry {
                    proposal_id: proposal.id.clone(),
                    section: None,
                    line_number: None,
                    checked: None,
                },
            })
            .collect()
    }
}

/// First item stamped with `origin`, and with `text` when given
fn find_marked<'d>(
    doc: &'d Document,
    origin: &ProvenanceMarker,
    text: Option<&str>,
) -> Option<(&'d SectionName, &'d TaskItem)> {
    let wanted = text.map(normalize_text);
    doc.task_items()
        .find(|(_, item)| {
            item.provenance
                .as_ref()
                .is_some_and(|marker| marker.same_origin(origin))
                && wanted
                    .as_ref()
                    .map_or(true, |wanted| *wanted == normalize_text(&item.text))
        })
        .map(|(section, item)| (&section.name, item))
}
