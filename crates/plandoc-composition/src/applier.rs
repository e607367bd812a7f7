//! Patch application
//!
//! Applies an [`InsertionPlan`] to text as a pure function. Directives run in
//! strictly descending line order so that no directive's line numbers are
//! shifted by an earlier one. At equal lines deletions run first, and
//! insertions run in reverse plan order so their lines end up in plan order.
//!
//! Failures are per directive: a stale deletion is skipped and reported,
//! together with the insertion it travels with, and the rest still applies.

use crate::plan::{Directive, InsertionPlan, MoveGroup, PlannedLine};
use plandoc_artifact::{join_lines, split_lines, ContentHash, SectionName};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Why a directive was not applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ApplySkip {
    /// The range no longer holds what the plan expected
    StaleTarget {
        /// Fingerprint prefix captured at plan time
        expected: String,
        /// First line of the range now
        found: String,
    },
    /// The directive points past the end of the text
    OutOfRange {
        /// Offending line
        line: usize,
        /// Lines in the text
        line_count: usize,
    },
    /// An insertion lands strictly inside a deletion, or deletions overlap
    Conflict {
        /// Deletion start
        start: usize,
        /// Deletion end
        end: usize,
    },
    /// The other half of a move was skipped
    LinkedMoveSkipped {
        /// Move that was abandoned
        group: MoveGroup,
    },
}

/// A directive (or one inserted line) that was not applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDirective {
    /// What was skipped
    pub directive: String,
    /// Why
    pub reason: ApplySkip,
}

/// What an apply changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    /// Directives applied
    pub applied: usize,
    /// Task lines inserted
    pub inserted_lines: usize,
    /// Lines deleted
    pub deleted_lines: usize,
    /// Sections appended
    pub created_sections: Vec<SectionName>,
    /// Partial failures
    pub skipped: Vec<SkippedDirective>,
    /// Whether the text was the one the plan was computed from
    pub base_matched: bool,
}

impl ApplyReport {
    /// Whether every directive applied
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Whether the text changed
    #[inline]
    #[must_use]
    pub fn changed(&self) -> bool {
        self.applied > 0
    }
}

/// Patched text and report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Resulting text
    pub text: String,
    /// What happened
    pub report: ApplyReport,
}

/// Applies insertion plans to text
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchApplier;

impl PatchApplier {
    /// Create an applier
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Apply `plan` to `text`
    #[must_use]
    pub fn apply(&self, text: &str, plan: &InsertionPlan) -> ApplyOutcome {
        let (mut lines, mut trailing_newline) = split_lines(text);
        let was_empty = lines.is_empty();
        let mut report = ApplyReport {
            base_matched: ContentHash::of_text(text) == plan.base_hash,
            ..ApplyReport::default()
        };
        if !report.base_matched {
            debug!("text changed since planning; verifying deletions by fingerprint");
        }

        let (valid, failed_groups) = Self::validate(&lines, plan, &mut report);

        let mut order: Vec<(usize, &Directive)> = plan
            .directives
            .iter()
            .enumerate()
            .filter(|(idx, directive)| {
                valid[*idx]
                    && !matches!(directive, Directive::Delete { move_group: Some(g), .. } if failed_groups.contains(g))
            })
            .collect();
        order.sort_by_key(|(idx, directive)| {
            (Reverse(directive.anchor()), !directive.is_delete(), Reverse(*idx))
        });

        for (_, directive) in order {
            match directive {
                Directive::Delete { start, end, .. } => {
                    lines.drain(*start..*end);
                    report.deleted_lines += end - start;
                    report.applied += 1;
                }
                Directive::Insert { line, lines: planned, .. } => {
                    let rendered = Self::render_lines(planned, &failed_groups, &mut report);
                    if rendered.is_empty() {
                        continue;
                    }
                    report.inserted_lines += rendered.len();
                    lines.splice(*line..*line, rendered);
                    report.applied += 1;
                }
                Directive::CreateSection {
                    line,
                    name,
                    level,
                    blank_before,
                    lines: planned,
                } => {
                    let rendered = Self::render_lines(planned, &failed_groups, &mut report);
                    if rendered.is_empty() {
                        continue;
                    }
                    report.inserted_lines += rendered.len();
                    let mut block = Vec::with_capacity(rendered.len() + 2);
                    if *blank_before {
                        block.push(String::new());
                    }
                    block.push(format!("{} {name}", "#".repeat(usize::from(*level))));
                    block.extend(rendered);
                    lines.splice(*line..*line, block);
                    report.created_sections.push(name.clone());
                    report.applied += 1;
                }
            }
        }

        if was_empty && !lines.is_empty() {
            trailing_newline = true;
        }

        debug!(
            applied = report.applied,
            inserted = report.inserted_lines,
            deleted = report.deleted_lines,
            skipped = report.skipped.len(),
            "applied plan"
        );

        ApplyOutcome {
            text: join_lines(&lines, trailing_newline),
            report,
        }
    }

    /// Check every directive against the untouched text
    ///
    /// Descending application never shifts lines below the directive being
    /// applied, so checking up front is equivalent to checking right before
    /// each directive runs.
    fn validate(
        lines: &[String],
        plan: &InsertionPlan,
        report: &mut ApplyReport,
    ) -> (Vec<bool>, HashSet<MoveGroup>) {
        let line_count = lines.len();
        let mut valid = vec![true; plan.directives.len()];
        let mut failed_groups = HashSet::new();
        let mut deleted: Vec<(usize, usize)> = Vec::new();

        for (idx, directive) in plan.directives.iter().enumerate() {
            let problem = match directive {
                Directive::Delete {
                    start,
                    end,
                    fingerprint,
                    ..
                } => {
                    if *end > line_count || start >= end {
                        Some(ApplySkip::OutOfRange {
                            line: *end,
                            line_count,
                        })
                    } else if let Some(&(s, e)) =
                        deleted.iter().find(|(s, e)| start < e && s < end)
                    {
                        Some(ApplySkip::Conflict { start: s, end: e })
                    } else if !fingerprint.matches(&lines[*start..*end]) {
                        Some(ApplySkip::StaleTarget {
                            expected: fingerprint.prefix().to_string(),
                            found: lines[*start].clone(),
                        })
                    } else {
                        deleted.push((*start, *end));
                        None
                    }
                }
                Directive::Insert { line, .. } | Directive::CreateSection { line, .. } => {
                    if *line > line_count {
                        Some(ApplySkip::OutOfRange {
                            line: *line,
                            line_count,
                        })
                    } else {
                        plan.directives
                            .iter()
                            .find_map(|other| match other {
                                Directive::Delete { start, end, .. } if start < line && line < end => {
                                    Some(ApplySkip::Conflict {
                                        start: *start,
                                        end: *end,
                                    })
                                }
                                _ => None,
                            })
                    }
                }
            };

            if let Some(reason) = problem {
                warn!(directive = %directive, ?reason, "skipping directive");
                valid[idx] = false;
                match directive {
                    Directive::Delete {
                        move_group: Some(group),
                        ..
                    } => {
                        failed_groups.insert(*group);
                    }
                    _ => failed_groups.extend(
                        directive
                            .planned_lines()
                            .iter()
                            .filter_map(|line| line.move_group),
                    ),
                }
                report.skipped.push(SkippedDirective {
                    directive: directive.to_string(),
                    reason,
                });
            }
        }

        for (idx, directive) in plan.directives.iter().enumerate() {
            if let Directive::Delete {
                move_group: Some(group),
                ..
            } = directive
            {
                if valid[idx] && failed_groups.contains(group) {
                    warn!(directive = %directive, "skipping deletion of abandoned move");
                    report.skipped.push(SkippedDirective {
                        directive: directive.to_string(),
                        reason: ApplySkip::LinkedMoveSkipped { group: *group },
                    });
                }
            }
        }

        (valid, failed_groups)
    }

    /// Render lines, dropping those whose move was abandoned
    fn render_lines(
        planned: &[PlannedLine],
        failed_groups: &HashSet<MoveGroup>,
        report: &mut ApplyReport,
    ) -> Vec<String> {
        planned
            .iter()
            .filter(|line| match line.move_group {
                Some(group) if failed_groups.contains(&group) => {
                    warn!(text = %line.task.text, %group, "skipping insertion of abandoned move");
                    report.skipped.push(SkippedDirective {
                        directive: format!("insert '{}' ({group})", line.task.text),
                        reason: ApplySkip::LinkedMoveSkipped { group },
                    });
                    false
                }
                _ => true,
            })
            .map(PlannedLine::render)
            .collect()
    }
}
