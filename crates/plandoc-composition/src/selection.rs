//! Placement selections
//!
//! A [`PlacementSelection`] is the reviewer-confirmed decision about one
//! item: what text lands where, and with which link and origin.

use crate::proposal::{Destination, ProposalId};
use plandoc_artifact::{ProvenanceMarker, SectionName, SliceReference};
use serde::{Deserialize, Serialize};

/// Normalized, confirmable placement of one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementSelection {
    /// Proposal this selection came from
    pub source_proposal_id: ProposalId,
    /// Text written to the document
    pub final_text: String,
    /// Target section, or discard
    pub destination: Destination,
    /// Slice link written after the text
    pub slice_link: Option<SliceReference>,
    /// Origin stamped on the inserted line
    pub provenance: ProvenanceMarker,
    /// Checkbox state; `None` keeps a moved item's state (unchecked when new)
    pub checked: Option<bool>,
    /// Text of an existing item to move instead of inserting a copy
    pub relocate_from: Option<String>,
}

impl PlacementSelection {
    /// Selection inserting `text` into `destination`
    #[must_use]
    pub fn new(
        source_proposal_id: ProposalId,
        text: impl Into<String>,
        destination: Destination,
        provenance: ProvenanceMarker,
    ) -> Self {
        Self {
            source_proposal_id,
            final_text: text.into(),
            destination,
            slice_link: None,
            provenance,
            checked: None,
            relocate_from: None,
        }
    }

    /// Set the slice link
    #[inline]
    #[must_use]
    pub fn with_slice_link(mut self, link: Option<SliceReference>) -> Self {
        self.slice_link = link;
        self
    }

    /// Force the checkbox state
    #[inline]
    #[must_use]
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    /// Move the existing item with this text
    #[inline]
    #[must_use]
    pub fn relocating(mut self, existing: impl Into<String>) -> Self {
        self.relocate_from = Some(existing.into());
        self
    }

    /// Whether the selection was discarded
    #[inline]
    #[must_use]
    pub fn is_discard(&self) -> bool {
        self.destination.is_discard()
    }

    /// Target section, `None` for discards
    #[inline]
    #[must_use]
    pub fn destination_section(&self) -> Option<&SectionName> {
        self.destination.section_name()
    }
}
