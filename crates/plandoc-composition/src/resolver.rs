//! Placement resolution
//!
//! Computes, per destination section, where new lines go and which lines a
//! move removes. New lines are appended after the last non-blank line of the
//! destination; existing order is never changed. Selections for the same
//! section keep their input order.

use crate::plan::{
    Directive, InsertionPlan, MoveGroup, PlannedLine, SkipReason, SkippedSelection,
};
use crate::selection::PlacementSelection;
use indexmap::IndexMap;
use plandoc_artifact::{normalize_text, Document, SectionName, TaskItem, TaskLine};
use std::collections::HashSet;
use tracing::debug;

/// Default fingerprint length in characters
pub const DEFAULT_FINGERPRINT_LEN: usize = 48;

/// Default heading level of synthesized sections
pub const DEFAULT_HEADING_LEVEL: u8 = 2;

/// Turns selections into an [`InsertionPlan`]
#[derive(Debug, Clone, Copy)]
pub struct PlacementResolver {
    fingerprint_len: usize,
    heading_level: u8,
}

impl Default for PlacementResolver {
    fn default() -> Self {
        Self {
            fingerprint_len: DEFAULT_FINGERPRINT_LEN,
            heading_level: DEFAULT_HEADING_LEVEL,
        }
    }
}

impl PlacementResolver {
    /// Resolver with default settings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With fingerprint length for deletions
    #[inline]
    #[must_use]
    pub fn with_fingerprint_len(mut self, len: usize) -> Self {
        self.fingerprint_len = len.max(1);
        self
    }

    /// With heading level for synthesized sections
    #[inline]
    #[must_use]
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 6);
        self
    }

    /// Resolve a batch of selections against a document
    #[must_use]
    pub fn resolve(&self, doc: &Document, selections: &[PlacementSelection]) -> InsertionPlan {
        let mut plan = InsertionPlan::empty(*doc.hash());
        let mut deletes = Vec::new();
        let mut inserts: IndexMap<usize, Vec<PlannedLine>> = IndexMap::new();
        let mut creates: IndexMap<SectionName, Vec<PlannedLine>> = IndexMap::new();
        let mut claimed: HashSet<usize> = HashSet::new();
        let mut placed: HashSet<(String, String)> = HashSet::new();

        for selection in selections {
            let Some(destination) = selection.destination_section() else {
                plan.skipped.push(skip(selection, SkipReason::Discarded));
                continue;
            };

            let text_key = normalize_text(&selection.final_text);
            let place_key = (destination.key().to_string(), text_key.clone());
            if placed.contains(&place_key) {
                plan.skipped.push(skip(selection, SkipReason::DuplicateInBatch));
                continue;
            }

            let target = doc.section_index(destination);
            let in_destination = target.and_then(|idx| {
                doc.sections()[idx].items.iter().find(|item| {
                    !claimed.contains(&item.line_number) && normalize_text(&item.text) == text_key
                })
            });
            if let Some(item) = in_destination {
                if selection.relocate_from.is_some() {
                    claimed.insert(item.line_number);
                }
                placed.insert(place_key);
                plan.skipped.push(skip(selection, SkipReason::AlreadyPlaced));
                continue;
            }

            let existing = selection
                .relocate_from
                .as_deref()
                .and_then(|text| find_unclaimed(doc, text, &claimed));
            if let Some((_, item)) = existing.filter(|(section, _)| *section == destination) {
                claimed.insert(item.line_number);
                placed.insert(place_key);
                plan.skipped.push(skip(selection, SkipReason::AlreadyPlaced));
                continue;
            }

            let mut move_group = None;
            if let Some((_, item)) = existing {
                if let Some(fingerprint) =
                    doc.fingerprint(item.line_number, item.line_number + 1, self.fingerprint_len)
                {
                    let group = MoveGroup(deletes.len());
                    deletes.push(Directive::Delete {
                        start: item.line_number,
                        end: item.line_number + 1,
                        fingerprint,
                        move_group: Some(group),
                    });
                    claimed.insert(item.line_number);
                    move_group = Some(group);
                }
            }

            let line = PlannedLine {
                source_proposal_id: selection.source_proposal_id.clone(),
                task: task_line(selection, existing.map(|(_, item)| item)),
                provenance: selection.provenance.clone(),
                move_group,
            };
            match target {
                Some(idx) => inserts.entry(idx).or_default().push(line),
                None => creates.entry(destination.clone()).or_default().push(line),
            }
            placed.insert(place_key);
        }

        plan.directives.extend(deletes);
        for (idx, lines) in inserts {
            let section = &doc.sections()[idx];
            plan.directives.push(Directive::Insert {
                line: doc.insertion_line(section),
                section: section.name.clone(),
                lines,
            });
        }

        let end = doc.line_count();
        let ends_blank = doc.lines().last().map_or(true, |l| l.trim().is_empty());
        for (position, (name, lines)) in creates.into_iter().enumerate() {
            plan.synthesized_sections.push(name.clone());
            plan.directives.push(Directive::CreateSection {
                line: end,
                name,
                level: self.heading_level,
                blank_before: position > 0 || !ends_blank,
                lines,
            });
        }

        debug!(
            directives = plan.directives.len(),
            skipped = plan.skipped.len(),
            synthesized = plan.synthesized_sections.len(),
            "resolved placements"
        );
        plan
    }
}

fn skip(selection: &PlacementSelection, reason: SkipReason) -> SkippedSelection {
    SkippedSelection {
        selection: selection.clone(),
        reason,
    }
}

/// First item with matching text that no earlier selection has moved
fn find_unclaimed<'d>(
    doc: &'d Document,
    text: &str,
    claimed: &HashSet<usize>,
) -> Option<(&'d SectionName, &'d TaskItem)> {
    let wanted = normalize_text(text);
    doc.task_items()
        .find(|(_, item)| {
            !claimed.contains(&item.line_number) && normalize_text(&item.text) == wanted
        })
        .map(|(section, item)| (&section.name, item))
}

/// Line for a selection, carrying over state from the item it moves
fn task_line(selection: &PlacementSelection, moved: Option<&TaskItem>) -> TaskLine {
    let checked = selection
        .checked
        .unwrap_or_else(|| moved.is_some_and(|item| item.checked));
    let slice_link = selection
        .slice_link
        .clone()
        .or_else(|| moved.and_then(|item| item.slice_link.clone()));
    TaskLine::new(normalize_text(&selection.final_text))
        .checked(checked)
        .with_slice_link(slice_link)
}
