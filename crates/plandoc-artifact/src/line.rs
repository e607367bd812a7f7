//! Task line format
//!
//! ```text
//! - [ ] <text> [[<container>#<sliceId> — <label>]] <!-- from <sourceFile> <context> -->
//! ```
//!
//! The slice link and provenance comment are optional trailing tokens and may
//! appear in either order. Everything else between the checkbox and the
//! trailing tokens is the task text.

use crate::provenance::ProvenanceMarker;
use crate::slice::SliceReference;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static CHECKBOX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)[-*+][ \t]+\[(?P<mark>[ xX])\](?:[ \t]+(?P<rest>.*))?$")
        .expect("static checkbox regex")
});

static CHECKBOX_LIKE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*[-*+][ \t]*\[[^\]]{0,3}\](?:[^(]|$)").expect("static checkbox-like regex"));

/// A parsed checkbox line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLine {
    /// Leading whitespace
    pub indent: String,
    /// Checkbox state
    pub checked: bool,
    /// Task text without trailing tokens
    pub text: String,
    /// Trailing slice link
    pub slice_link: Option<SliceReference>,
    /// Trailing provenance comment
    pub provenance: Option<ProvenanceMarker>,
}

impl TaskLine {
    /// Create an unindented, unchecked task line
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            indent: String::new(),
            checked: false,
            text: text.into(),
            slice_link: None,
            provenance: None,
        }
    }

    /// Set the checkbox state
    #[must_use]
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Attach a slice link
    #[must_use]
    pub fn with_slice_link(mut self, link: Option<SliceReference>) -> Self {
        self.slice_link = link;
        self
    }

    /// Attach a provenance marker
    #[must_use]
    pub fn with_provenance(mut self, marker: Option<ProvenanceMarker>) -> Self {
        self.provenance = marker;
        self
    }

    /// Render back to a single line (link first, then comment)
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!(
            "{}- [{}] {}",
            self.indent,
            if self.checked { 'x' } else { ' ' },
            self.text
        );
        if let Some(link) = &self.slice_link {
            out.push(' ');
            out.push_str(&link.to_token());
        }
        if let Some(marker) = &self.provenance {
            out.push(' ');
            out.push_str(&marker.to_comment());
        }
        out
    }
}

/// Classification of a single raw line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// A well-formed checkbox line
    Task(TaskLine),
    /// Looks like a checkbox but cannot be read as one
    Ambiguous(String),
    /// Anything else
    Other,
}

/// Classify a raw line
#[must_use]
pub fn classify_line(line: &str) -> LineClass {
    let Some(caps) = CHECKBOX_RE.captures(line) else {
        return if CHECKBOX_LIKE_RE.is_match(line) {
            LineClass::Ambiguous("malformed checkbox".to_string())
        } else {
            LineClass::Other
        };
    };

    let indent = caps.name("indent").map_or("", |m| m.as_str()).to_string();
    let checked = caps.name("mark").is_some_and(|m| m.as_str() != " ");
    let rest = caps.name("rest").map_or("", |m| m.as_str());

    let (text, slice_link, provenance) = split_trailing_tokens(rest);
    if text.is_empty() {
        return LineClass::Ambiguous("checkbox without text".to_string());
    }

    LineClass::Task(TaskLine {
        indent,
        checked,
        text,
        slice_link,
        provenance,
    })
}

/// Parse a checkbox line, ignoring anything else
#[must_use]
pub fn parse_task_line(line: &str) -> Option<TaskLine> {
    match classify_line(line) {
        LineClass::Task(task) => Some(task),
        LineClass::Ambiguous(_) | LineClass::Other => None,
    }
}

/// Peel slice link and provenance comment off the end of `rest`
fn split_trailing_tokens(rest: &str) -> (String, Option<SliceReference>, Option<ProvenanceMarker>) {
    let mut body = rest.trim_end();
    let mut slice_link = None;
    let mut provenance = None;

    loop {
        if provenance.is_none() && body.ends_with("-->") {
            if let Some(start) = body.rfind("<!--") {
                if let Ok(marker) = ProvenanceMarker::parse(&body[start..]) {
                    provenance = Some(marker);
                    body = body[..start].trim_end();
                    continue;
                }
            }
        }
        if slice_link.is_none() && body.ends_with("]]") {
            if let Some(start) = body.rfind("[[") {
                if let Ok(link) = SliceReference::parse_inner(&body[start + 2..body.len() - 2]) {
                    slice_link = Some(link);
                    body = body[..start].trim_end();
                    continue;
                }
            }
        }
        break;
    }

    (body.trim().to_string(), slice_link, provenance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_task() {
        let task = parse_task_line("- [ ] Write README").unwrap();
        assert_eq!(task.text, "Write README");
        assert!(!task.checked);
        assert!(task.slice_link.is_none());
        assert!(task.provenance.is_none());
    }

    #[test]
    fn parses_checked_and_indented() {
        let task = parse_task_line("  * [X] Ship v1").unwrap();
        assert!(task.checked);
        assert_eq!(task.indent, "  ");
        assert_eq!(task.text, "Ship v1");
    }

    #[test]
    fn strips_link_then_comment() {
        let task = parse_task_line(
            "- [ ] Build parser [[Milestone 1#S2 — Parser]] <!-- from Log.md 2024-01-15 -->",
        )
        .unwrap();
        assert_eq!(task.text, "Build parser");
        assert_eq!(task.slice_link.unwrap().slice_id, "S2");
        assert_eq!(
            task.provenance.unwrap().source_context.as_deref(),
            Some("2024-01-15")
        );
    }

    #[test]
    fn strips_comment_then_link() {
        let task =
            parse_task_line("- [ ] Build parser <!-- from Ideas.md: Parsing --> [[M1#S2]]").unwrap();
        assert_eq!(task.text, "Build parser");
        assert!(task.slice_link.is_some());
        assert_eq!(task.provenance.unwrap().source_file, "Ideas.md");
    }

    #[test]
    fn keeps_non_marker_comment_in_text() {
        let task = parse_task_line("- [ ] Tidy <!-- remember the docs -->").unwrap();
        assert_eq!(task.text, "Tidy <!-- remember the docs -->");
        assert!(task.provenance.is_none());
    }

    #[test]
    fn flags_malformed_checkboxes() {
        assert!(matches!(classify_line("- [~] Half done"), LineClass::Ambiguous(_)));
        assert!(matches!(classify_line("-[ ] squashed"), LineClass::Ambiguous(_)));
        assert!(matches!(classify_line("- [ ]"), LineClass::Ambiguous(_)));
        assert_eq!(classify_line("Just prose"), LineClass::Other);
        assert_eq!(classify_line("- plain bullet"), LineClass::Other);
        assert_eq!(classify_line("- [ab](https://x.test) link"), LineClass::Other);
    }

    #[test]
    fn render_roundtrip() {
        let line = TaskLine::new("Ship v1")
            .checked(true)
            .with_slice_link(Some(SliceReference::new("M1", "S3", "Launch")))
            .with_provenance(Some(ProvenanceMarker::new("git", Some("abc123"))));
        let rendered = line.render();
        assert_eq!(
            rendered,
            "- [x] Ship v1 [[M1#S3 — Launch]] <!-- from git: abc123 -->"
        );
        assert_eq!(parse_task_line(&rendered).unwrap(), line);
    }
}
