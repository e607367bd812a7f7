//! Testing utilities for the plandoc workspace
//!
//! Shared fixtures, proposal builders, and document assertions.

#![allow(missing_docs)]

use chrono::NaiveDate;
use plandoc_core::artifact::SectionName;
use plandoc_core::composition::{ChangeProposal, Destination, ProposalNormalizer};
use plandoc_core::parser::DocumentParser;
use plandoc_core::{EngineConfig, Reconciler, Reconciliation};

/// Task document with a preamble, three task sections, and "Ship v1" on line 12
pub const TASKS_DOC: &str = "\
# Project Tasks

Notes for the week.

## Current
- [ ] Fix login redirect
- [x] Update deps <!-- from Log.md 2024-01-10 -->

## Later
- [ ] Write docs
- [ ] Profile startup
- [ ] Add dark mode
- [ ] Ship v1 [[Milestone 1#S2 — Release]]

## Done
- [x] Set up CI
";

/// Both sections empty
pub const EMPTY_SECTIONS_DOC: &str = "## Later\n\n## Current\n";

/// Roadmap with one slice list
pub const ROADMAP_DOC: &str = "\
# Roadmap

## Milestone 1
- [x] S1 — Prototype
- [ ] S2 — Release

## Notes
Free text.
";

/// Task document with a fenced block that looks like structure
pub const FENCED_DOC: &str = "\
## Current
- [ ] Real task

```markdown
## Later
- [ ] Not a task
```
";

pub fn dest(name: &str) -> Destination {
    Destination::section(name).unwrap()
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

pub fn harvested(text: &str, file: &str, day: &str, destination: &str) -> ChangeProposal {
    ChangeProposal::harvested(text, file, Some(date(day)), dest(destination))
}

pub fn groomed(text: &str, heading: &str, destination: &str) -> ChangeProposal {
    ChangeProposal::groomed(text, "Ideas.md", Some(heading), dest(destination))
}

pub fn promotion(text: &str, destination: &str) -> ChangeProposal {
    ChangeProposal::groomed(text, "Roadmap.md", None, dest(destination)).promoting(text)
}

pub fn reconciler() -> Reconciler {
    Reconciler::new(EngineConfig::default()).unwrap()
}

pub fn reconcile(text: &str, proposals: &[ChangeProposal]) -> Reconciliation {
    reconciler().reconcile(text, proposals, &ProposalNormalizer::new())
}

/// Parser that also recognizes `extra` as task sections
pub fn parser_with(extra: &[&str]) -> DocumentParser {
    let vocabulary = extra.iter().fold(
        EngineConfig::default().vocabulary().unwrap(),
        |vocab, name| vocab.with_task_section(SectionName::new(*name).unwrap()),
    );
    DocumentParser::new(vocabulary)
}

/// Task texts of one section, in document order
pub fn items_in(text: &str, section: &str) -> Vec<String> {
    let doc = parser_with(&[section]).parse(text);
    doc.section(&SectionName::new(section).unwrap())
        .map(|s| s.items.iter().map(|i| i.text.clone()).collect())
        .unwrap_or_default()
}

/// Number of task items across the document with exactly this text
pub fn task_count(text: &str, task: &str) -> usize {
    parser_with(&[])
        .parse(text)
        .task_items()
        .filter(|(_, item)| item.text == task)
        .count()
}

/// Number of lines in `text` that contain `needle`
pub fn lines_containing(text: &str, needle: &str) -> usize {
    text.lines().filter(|line| line.contains(needle)).count()
}
