//! Parsed document model
//!
//! A [`Document`] is an ordered list of [`Section`]s covering every line of
//! the source text exactly once. Lines before the first heading belong to a
//! preamble section. Line numbers are zero-based; `end_line` is exclusive.

use crate::hash::{ContentHash, Fingerprint};
use crate::name::SectionName;
use crate::provenance::ProvenanceMarker;
use crate::slice::SliceReference;
use serde::{Deserialize, Serialize};

/// What a section contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    /// Checkbox tasks (Current, Later, Blocked, Done, ...)
    TaskList,
    /// Roadmap milestone with slice entries
    SliceList,
    /// Anything else
    Freeform,
}

/// Checkbox task owned by one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    /// Task text without trailing tokens
    pub text: String,
    /// Checkbox state
    pub checked: bool,
    /// Trailing slice link
    pub slice_link: Option<SliceReference>,
    /// Trailing provenance comment
    pub provenance: Option<ProvenanceMarker>,
    /// Zero-based line index
    pub line_number: usize,
}

/// Slice entry inside a slice-list section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceEntry {
    /// Slice identifier (e.g. `S2`)
    pub slice_id: String,
    /// Human label
    pub label: String,
    /// Checkbox state, false when the entry has no checkbox
    pub done: bool,
    /// Zero-based line index
    pub line_number: usize,
}

/// A contiguous named region of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text (empty for the preamble)
    pub name: SectionName,
    /// Classification
    pub kind: SectionKind,
    /// Heading level (`0` for the preamble)
    pub level: u8,
    /// First line (the heading line, or 0 for the preamble)
    pub start_line: usize,
    /// One past the last line
    pub end_line: usize,
    /// Tasks in line order (task-list sections only)
    pub items: Vec<TaskItem>,
    /// Slices in line order (slice-list sections only)
    pub slices: Vec<SliceEntry>,
}

impl Section {
    /// Whether the section starts with a heading line
    #[inline]
    #[must_use]
    pub fn has_heading(&self) -> bool {
        self.level > 0
    }

    /// Whether `line` lies inside this section
    #[inline]
    #[must_use]
    pub fn contains_line(&self, line: usize) -> bool {
        (self.start_line..self.end_line).contains(&line)
    }

    /// Number of lines
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.end_line - self.start_line
    }

    /// Whether the section spans no lines
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start_line == self.end_line
    }
}

/// Line-level problem the parser recovered from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseDiagnostic {
    /// A heading or checkbox line could not be classified
    StructuralAmbiguity {
        /// Zero-based line index
        line: usize,
        /// What was wrong
        reason: String,
    },
}

impl ParseDiagnostic {
    /// Line the diagnostic refers to
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::StructuralAmbiguity { line, .. } => *line,
        }
    }
}

/// Parsed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    lines: Vec<String>,
    trailing_newline: bool,
    sections: Vec<Section>,
    diagnostics: Vec<ParseDiagnostic>,
    hash: ContentHash,
}

impl Document {
    /// Assemble a document from parser output
    ///
    /// Sections must be sorted, contiguous and cover `0..lines.len()`.
    #[must_use]
    pub fn from_parts(
        text: &str,
        sections: Vec<Section>,
        diagnostics: Vec<ParseDiagnostic>,
    ) -> Self {
        let (lines, trailing_newline) = split_lines(text);
        debug_assert!(sections_are_contiguous(&sections, lines.len()));
        Self {
            lines,
            trailing_newline,
            sections,
            diagnostics,
            hash: ContentHash::of_text(text),
        }
    }

    /// Source lines without terminators
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Whether the source ended with a newline
    #[inline]
    #[must_use]
    pub fn trailing_newline(&self) -> bool {
        self.trailing_newline
    }

    /// Hash of the source text
    #[inline]
    #[must_use]
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    /// Sections in line order
    #[inline]
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Recovered parse problems
    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }

    /// First section with the given name
    #[must_use]
    pub fn section(&self, name: &SectionName) -> Option<&Section> {
        self.sections.iter().find(|s| &s.name == name)
    }

    /// Index of the first section with the given name
    #[must_use]
    pub fn section_index(&self, name: &SectionName) -> Option<usize> {
        self.sections.iter().position(|s| &s.name == name)
    }

    /// Section containing a line
    #[must_use]
    pub fn section_at(&self, line: usize) -> Option<&Section> {
        self.sections.iter().find(|s| s.contains_line(line))
    }

    /// All task items with their owning section
    pub fn task_items(&self) -> impl Iterator<Item = (&Section, &TaskItem)> {
        self.sections
            .iter()
            .flat_map(|section| section.items.iter().map(move |item| (section, item)))
    }

    /// First task item whose text equals `text` (whitespace-insensitive)
    #[must_use]
    pub fn find_task(&self, text: &str) -> Option<(&Section, &TaskItem)> {
        let wanted = normalize_text(text);
        self.task_items()
            .find(|(_, item)| normalize_text(&item.text) == wanted)
    }

    /// Line at which new lines are appended to a section
    ///
    /// This is the line after the section's last non-blank line, so trailing
    /// blank lines that separate it from the next heading stay in place.
    #[must_use]
    pub fn insertion_line(&self, section: &Section) -> usize {
        let floor = if section.has_heading() {
            section.start_line + 1
        } else {
            section.start_line
        };
        (floor..section.end_line)
            .rev()
            .find(|&line| !self.lines[line].trim().is_empty())
            .map_or(floor, |line| line + 1)
    }

    /// Fingerprint of a line range
    ///
    /// Returns `None` if the range lies outside the document.
    #[must_use]
    pub fn fingerprint(&self, start: usize, end: usize, len: usize) -> Option<Fingerprint> {
        (start < end && end <= self.lines.len())
            .then(|| Fingerprint::capture(&self.lines[start..end], len))
    }

    /// Resolve a slice reference against this (roadmap) document
    #[must_use]
    pub fn resolve_slice(&self, reference: &SliceReference) -> Option<(&Section, &SliceEntry)> {
        self.sections
            .iter()
            .filter(|s| s.kind == SectionKind::SliceList && s.name.matches(&reference.container))
            .find_map(|section| {
                section
                    .slices
                    .iter()
                    .find(|slice| slice.slice_id == reference.slice_id)
                    .map(|slice| (section, slice))
            })
    }

    /// Reassemble the original text
    #[must_use]
    pub fn to_text(&self) -> String {
        join_lines(&self.lines, self.trailing_newline)
    }
}

/// Split text into lines without terminators
///
/// Returns the lines and whether the text ended with `\n`.
#[must_use]
pub fn split_lines(text: &str) -> (Vec<String>, bool) {
    if text.is_empty() {
        return (Vec::new(), false);
    }
    let trailing = text.ends_with('\n');
    let body = if trailing { &text[..text.len() - 1] } else { text };
    (body.split('\n').map(str::to_string).collect(), trailing)
}

/// Inverse of [`split_lines`]
#[must_use]
pub fn join_lines<S: AsRef<str>>(lines: &[S], trailing_newline: bool) -> String {
    let mut out = lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");
    if trailing_newline && !lines.is_empty() {
        out.push('\n');
    }
    out
}

/// Comparison form of task text
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn sections_are_contiguous(sections: &[Section], line_count: usize) -> bool {
    let mut cursor = 0;
    for section in sections {
        if section.start_line != cursor || section.end_line < section.start_line {
            return false;
        }
        cursor = section.end_line;
    }
    cursor == line_count
}
