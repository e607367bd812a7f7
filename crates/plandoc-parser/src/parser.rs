//! Line-scan document parser
//!
//! Single top-to-bottom pass with a "current section" cursor. A heading that
//! the [`Vocabulary`] recognizes closes the current section and opens a new
//! one; an unrecognized deeper heading closes a task list (so unknown
//! structure below it is never treated as tasks) and is plain content
//! anywhere else. Lines inside code blocks are opaque.

use crate::vocabulary::Vocabulary;
use once_cell::sync::Lazy;
use plandoc_artifact::{
    classify_line, split_lines, Document, LineClass, ParseDiagnostic, Section, SectionKind,
    SectionName, SliceEntry, TaskItem,
};
use pulldown_cmark::{Event, Parser as MdParser, Tag};
use regex::Regex;
use tracing::debug;

static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}(?P<hashes>#{1,6})(?:[ \t]+(?P<name>.*?))?(?:[ \t]+#+)?[ \t]*$")
        .expect("static heading regex")
});

static SLICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^[ \t]*(?:[-*+][ \t]+(?:\[(?P<mark>[ xX])\][ \t]+)?|#{3,6}[ \t]+)",
        r"(?:\*\*)?(?P<id>[A-Za-z]{0,4}\d[\w.]*)(?:\*\*)?",
        r"[ \t]*(?:—|-|:)[ \t]*(?P<label>.*?)[ \t]*$",
    ))
    .expect("static slice regex")
});

/// Parser for task and roadmap documents
#[derive(Debug, Clone, Default)]
pub struct DocumentParser {
    vocabulary: Vocabulary,
}

impl DocumentParser {
    /// Create a parser with the given vocabulary
    #[inline]
    #[must_use]
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Heading vocabulary in use
    #[inline]
    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Parse document text
    ///
    /// Never fails. Lines that cannot be classified are kept as opaque
    /// content and reported as diagnostics.
    #[must_use]
    pub fn parse(&self, text: &str) -> Document {
        let (lines, _) = split_lines(text);
        let opaque = code_block_lines(text, lines.len());

        let mut sections = Vec::new();
        let mut diagnostics = Vec::new();
        let mut current = OpenSection::preamble();

        for (idx, line) in lines.iter().enumerate() {
            if opaque[idx] {
                continue;
            }

            if let Some(heading) = parse_heading(line) {
                match heading {
                    Heading::Named { level, name } => {
                        let kind = self.vocabulary.classify(&name, level).or(
                            (current.kind == SectionKind::TaskList).then_some(SectionKind::Freeform),
                        );
                        if let Some(kind) = kind {
                            current.close(idx, &mut sections);
                            current = OpenSection::heading(name, kind, level, idx);
                            continue;
                        }
                    }
                    Heading::Empty => {
                        diagnostics.push(ParseDiagnostic::StructuralAmbiguity {
                            line: idx,
                            reason: "heading without a name".to_string(),
                        });
                        continue;
                    }
                }
            }

            match current.kind {
                SectionKind::TaskList => match classify_line(line) {
                    LineClass::Task(task) => current.items.push(TaskItem {
                        text: task.text,
                        checked: task.checked,
                        slice_link: task.slice_link,
                        provenance: task.provenance,
                        line_number: idx,
                    }),
                    LineClass::Ambiguous(reason) => {
                        diagnostics.push(ParseDiagnostic::StructuralAmbiguity { line: idx, reason });
                    }
                    LineClass::Other => {}
                },
                SectionKind::SliceList => {
                    if let Some(entry) = parse_slice_entry(line, idx) {
                        current.slices.push(entry);
                    } else if let LineClass::Ambiguous(reason) = classify_line(line) {
                        diagnostics.push(ParseDiagnostic::StructuralAmbiguity { line: idx, reason });
                    }
                }
                SectionKind::Freeform => {
                    if let LineClass::Ambiguous(reason) = classify_line(line) {
                        diagnostics.push(ParseDiagnostic::StructuralAmbiguity { line: idx, reason });
                    }
                }
            }
        }
        current.close(lines.len(), &mut sections);

        debug!(
            sections = sections.len(),
            items = sections.iter().map(|s| s.items.len()).sum::<usize>(),
            diagnostics = diagnostics.len(),
            "parsed document"
        );

        Document::from_parts(text, sections, diagnostics)
    }
}

/// Section under construction
struct OpenSection {
    name: SectionName,
    kind: SectionKind,
    level: u8,
    start_line: usize,
    items: Vec<TaskItem>,
    slices: Vec<SliceEntry>,
}

impl OpenSection {
    fn preamble() -> Self {
        Self::heading(SectionName::preamble(), SectionKind::Freeform, 0, 0)
    }

    fn heading(name: SectionName, kind: SectionKind, level: u8, start_line: usize) -> Self {
        Self {
            name,
            kind,
            level,
            start_line,
            items: Vec::new(),
            slices: Vec::new(),
        }
    }

    /// Push the finished section, dropping an empty preamble
    fn close(&mut self, end_line: usize, sections: &mut Vec<Section>) {
        if self.level == 0 && end_line == self.start_line {
            return;
        }
        sections.push(Section {
            name: self.name.clone(),
            kind: self.kind,
            level: self.level,
            start_line: self.start_line,
            end_line,
            items: std::mem::take(&mut self.items),
            slices: std::mem::take(&mut self.slices),
        });
    }
}

enum Heading {
    Named { level: u8, name: SectionName },
    Empty,
}

fn parse_heading(line: &str) -> Option<Heading> {
    let caps = HEADING_RE.captures(line)?;
    let level = u8::try_from(caps.name("hashes")?.as_str().len()).ok()?;
    let raw = caps.name("name").map_or("", |m| m.as_str());
    Some(match SectionName::new(raw) {
        Ok(name) => Heading::Named { level, name },
        Err(_) => Heading::Empty,
    })
}

fn parse_slice_entry(line: &str, line_number: usize) -> Option<SliceEntry> {
    let caps = SLICE_RE.captures(line)?;
    Some(SliceEntry {
        slice_id: caps.name("id")?.as_str().to_string(),
        label: caps.name("label").map_or("", |m| m.as_str()).to_string(),
        done: caps.name("mark").is_some_and(|m| m.as_str() != " "),
        line_number,
    })
}

/// Mark lines covered by fenced or indented code blocks
fn code_block_lines(text: &str, line_count: usize) -> Vec<bool> {
    let mut opaque = vec![false; line_count];
    if line_count == 0 {
        return opaque;
    }

    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect();
    let line_of = |offset: usize| line_starts.partition_point(|&s| s <= offset).saturating_sub(1);

    for (event, range) in MdParser::new(text).into_offset_iter() {
        if let Event::Start(Tag::CodeBlock(_)) = event {
            let first = line_of(range.start);
            let last = line_of(range.end.saturating_sub(1).max(range.start)).min(line_count - 1);
            for flag in opaque.iter_mut().take(last + 1).skip(first) {
                *flag = true;
            }
        }
    }
    opaque
}

#[cfg(test)]
mod tests {
    use super::*;
    use plandoc_artifact::SliceReference;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Document {
        DocumentParser::default().parse(text)
    }

    fn names(doc: &Document) -> Vec<&str> {
        doc.sections().iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn sections_cover_every_line() {
        let text = "# Plan\nintro\n\n## Current\n- [ ] A\n\n## Later\n- [x] B\n";
        let doc = parse(text);
        assert_eq!(names(&doc), vec!["Plan", "Current", "Later"]);
        let bounds: Vec<_> = doc
            .sections()
            .iter()
            .map(|s| (s.start_line, s.end_line))
            .collect();
        assert_eq!(bounds, vec![(0, 3), (3, 6), (6, 8)]);
        assert_eq!(doc.sections()[2].items[0].line_number, 7);
        assert!(doc.sections()[2].items[0].checked);
    }

    #[test]
    fn preamble_before_first_heading() {
        let doc = parse("notes\n- [ ] not a task here\n## Current\n");
        assert!(doc.sections()[0].name.is_preamble());
        assert_eq!(doc.sections()[0].end_line, 2);
        assert!(doc.sections()[0].items.is_empty());
    }

    #[test]
    fn empty_text_has_no_sections() {
        let doc = parse("");
        assert!(doc.sections().is_empty());
        assert_eq!(doc.line_count(), 0);
    }

    #[test]
    fn parses_trailing_tokens() {
        let doc = parse(
            "## Current\n- [ ] Build parser [[Milestone 1#S2 — Parser]] <!-- from Log.md 2024-01-15 -->\n",
        );
        let item = &doc.sections()[0].items[0];
        assert_eq!(item.text, "Build parser");
        assert_eq!(
            item.slice_link,
            Some(SliceReference::new("Milestone 1", "S2", "Parser"))
        );
        assert_eq!(item.provenance.as_ref().unwrap().source_file, "Log.md");
    }

    #[test]
    fn unrecognized_subheading_closes_task_list() {
        let doc = parse("## Current\n- [ ] A\n### Design notes\n- [ ] looks like a task\n");
        assert_eq!(names(&doc), vec!["Current", "Design notes"]);
        assert_eq!(doc.sections()[1].kind, SectionKind::Freeform);
        assert_eq!(doc.sections()[0].items.len(), 1);
        assert!(doc.sections()[1].items.is_empty());
    }

    #[test]
    fn subheading_inside_freeform_is_content() {
        let doc = parse("## Notes\n### Detail\ntext\n## Done\n");
        assert_eq!(names(&doc), vec!["Notes", "Done"]);
    }

    #[test]
    fn vocabulary_heading_at_any_level() {
        let doc = parse("# Tasks\n### Blocked\n- [ ] Waiting on API\n");
        assert_eq!(names(&doc), vec!["Tasks", "Blocked"]);
        assert_eq!(doc.sections()[1].items.len(), 1);
    }

    #[test]
    fn headings_in_code_fences_are_opaque() {
        let text = "## Current\n- [ ] A\n```md\n## Later\n- [ ] fenced\n```\n- [ ] B\n";
        let doc = parse(text);
        assert_eq!(names(&doc), vec!["Current"]);
        let texts: Vec<_> = doc.sections()[0].items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["A", "B"]);
    }

    #[test]
    fn ambiguous_lines_are_reported_not_fatal() {
        let doc = parse("## Current\n- [~] half\n##\n- [ ] fine\n");
        assert_eq!(doc.sections()[0].items.len(), 1);
        let lines: Vec<_> = doc.diagnostics().iter().map(ParseDiagnostic::line).collect();
        assert_eq!(lines, vec![1, 2]);
        assert_eq!(doc.sections()[0].end_line, 4);
    }

    #[test]
    fn closing_hashes_are_stripped() {
        let doc = parse("## Later ##\n## C#\n");
        assert_eq!(names(&doc), vec!["Later", "C#"]);
    }

    #[test]
    fn roadmap_slices_parse_and_resolve() {
        let text = "## Milestone 1: Alpha\n- [x] S1 — Scaffold\n- [ ] S2 - Parser\n### S3: Review\n## Notes\n";
        let doc = parse(text);
        let milestone = &doc.sections()[0];
        assert_eq!(milestone.kind, SectionKind::SliceList);
        let ids: Vec<_> = milestone.slices.iter().map(|s| s.slice_id.as_str()).collect();
        assert_eq!(ids, vec!["S1", "S2", "S3"]);
        assert!(milestone.slices[0].done);
        assert_eq!(milestone.slices[1].label, "Parser");

        let reference = SliceReference::new("milestone 1: alpha", "S2", "");
        let (_, slice) = doc.resolve_slice(&reference).unwrap();
        assert_eq!(slice.line_number, 2);
        assert!(doc
            .resolve_slice(&SliceReference::new("Milestone 1: Alpha", "S9", ""))
            .is_none());
    }

    #[test]
    fn parse_is_deterministic() {
        let text = "## Current\n- [ ] A\n\n## Done\n- [x] B <!-- from git: abc -->\n";
        assert_eq!(parse(text), parse(text));
    }

    #[test]
    fn crlf_lines_still_parse() {
        let doc = parse("## Current\r\n- [ ] A\r\n");
        assert_eq!(names(&doc), vec!["Current"]);
        assert_eq!(doc.sections()[0].items[0].text, "A");
        assert_eq!(doc.to_text(), "## Current\r\n- [ ] A\r\n");
    }
}
