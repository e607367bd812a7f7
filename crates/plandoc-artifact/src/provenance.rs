//! Provenance markers
//!
//! Every line the engine inserts carries an HTML comment naming where it came
//! from. The comment is the only record that an origin was already applied,
//! so it must survive arbitrary hand edits around it and parse back to the
//! same `(source_file, source_context)` pair it was written with.
//!
//! Two spellings are accepted:
//!
//! ```text
//! <!-- from Log.md 2024-01-15 -->
//! <!-- from Ideas.md: Offline mode -->
//! ```
//!
//! Dates are written in the first form, any other context in the second.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<!--\s*from\s+(?P<body>.*?)\s*-->$").expect("static marker regex")
});

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Where an inserted line came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProvenanceMarker {
    /// Producer input file (e.g. `Log.md`)
    pub source_file: String,
    /// Heading, date, commit id or other free-text context
    pub source_context: Option<String>,
}

impl ProvenanceMarker {
    /// Create a marker, normalizing whitespace in both parts
    #[must_use]
    pub fn new(source_file: impl AsRef<str>, source_context: Option<&str>) -> Self {
        Self {
            source_file: source_file.as_ref().trim().to_string(),
            source_context: source_context
                .map(collapse_whitespace)
                .filter(|ctx| !ctx.is_empty()),
        }
    }

    /// Parse a full `<!-- from ... -->` comment
    ///
    /// # Errors
    /// Returns error if the comment is not a provenance marker
    pub fn parse(comment: &str) -> Result<Self, MarkerError> {
        let caps = MARKER_RE
            .captures(comment.trim())
            .ok_or_else(|| MarkerError::NotAMarker(comment.to_string()))?;
        let body = caps.name("body").map_or("", |m| m.as_str()).trim();


        // File names may contain spaces but never a colon, so the first
        // colon ends the file; without one, only a trailing date is context.
        let (file, context) = match body.split_once(':') {
            Some((file, context)) => (file.trim_end(), Some(context)),
            None => match body.rsplit_once(char::is_whitespace) {
                Some((file, date)) if is_date(date) => (file.trim_end(), Some(date)),
                _ => (body, None),
            },
        };

        if file.is_empty() {
            return Err(MarkerError::MissingSourceFile(comment.to_string()));
        }

        Ok(Self::new(file, context))
    }

    /// Context interpreted as an ISO date, if it is one
    #[must_use]
    pub fn source_date(&self) -> Option<NaiveDate> {
        self.source_context
            .as_deref()
            .and_then(parse_date)
    }

    /// Whether this marker records the given origin
    #[must_use]
    pub fn same_origin(&self, other: &Self) -> bool {
        self.source_file == other.source_file && self.source_context == other.source_context
    }

    /// Render as an HTML comment
    #[must_use]
    pub fn to_comment(&self) -> String {
        self.to_string()
    }
}

impl Display for ProvenanceMarker {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (&self.source_context, self.source_date()) {
            (Some(ctx), Some(_)) => write!(f, "<!-- from {} {} -->", self.source_file, ctx),
            (Some(ctx), None) => write!(f, "<!-- from {}: {} -->", self.source_file, ctx),
            (None, _) => write!(f, "<!-- from {} -->", self.source_file),
        }
    }
}

impl FromStr for ProvenanceMarker {
    type Err = MarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

fn is_date(raw: &str) -> bool {
    parse_date(raw).is_some()
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Errors parsing provenance comments
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkerError {
    /// Comment is not of the `from` form
    #[error("not a provenance marker: '{0}'")]
    NotAMarker(String),

    /// `from` with nothing after it
    #[error("provenance marker names no source file: '{0}'")]
    MissingSourceFile(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_date_form() {
        let marker = ProvenanceMarker::parse("<!-- from Log.md 2024-01-15 -->").unwrap();
        assert_eq!(marker.source_file, "Log.md");
        assert_eq!(marker.source_context.as_deref(), Some("2024-01-15"));
        assert_eq!(
            marker.source_date(),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn parses_colon_form_with_spaces() {
        let marker = ProvenanceMarker::parse("<!-- from Ideas.md:  Offline   mode -->").unwrap();
        assert_eq!(marker.source_file, "Ideas.md");
        assert_eq!(marker.source_context.as_deref(), Some("Offline mode"));
    }

    #[test]
    fn parses_colon_without_space() {
        let marker = ProvenanceMarker::parse("<!--from Ideas.md:Sync-->").unwrap();
        assert_eq!(marker.source_file, "Ideas.md");
        assert_eq!(marker.source_context.as_deref(), Some("Sync"));
    }

    #[test]
    fn parses_file_only() {
        let marker = ProvenanceMarker::parse("<!-- from commits -->").unwrap();
        assert_eq!(marker.source_file, "commits");
        assert!(marker.source_context.is_none());
    }

    #[test]
    fn render_parse_roundtrip_preserves_origin() {
        for marker in [
            ProvenanceMarker::new("Log.md", Some("2024-03-01")),
            ProvenanceMarker::new("Ideas.md", Some("Export to CSV")),
            ProvenanceMarker::new("git", Some("a1b2c3d")),
            ProvenanceMarker::new("Archive.md", None),
        ] {
            let back = ProvenanceMarker::parse(&marker.to_comment()).unwrap();
            assert!(back.same_origin(&marker), "{marker}");
        }
    }

    #[test]
    fn file_names_with_spaces_keep_their_context() {
        let marker = ProvenanceMarker::parse("<!-- from Daily Log.md: Standup -->").unwrap();
        assert_eq!(marker.source_file, "Daily Log.md");
        assert_eq!(marker.source_context.as_deref(), Some("Standup"));

        let dated = ProvenanceMarker::parse("<!-- from Daily Log.md 2024-01-15 -->").unwrap();
        assert_eq!(dated.source_file, "Daily Log.md");
        assert_eq!(dated.source_context.as_deref(), Some("2024-01-15"));

        let bare = ProvenanceMarker::parse("<!-- from Team Notes.md -->").unwrap();
        assert_eq!(bare.source_file, "Team Notes.md");
        assert!(bare.source_context.is_none());
    }

    #[test]
    fn colon_context_ending_in_a_date_stays_whole() {
        let marker = ProvenanceMarker::parse("<!-- from Ideas.md: Release 2024-01-15 -->").unwrap();
        assert_eq!(marker.source_file, "Ideas.md");
        assert_eq!(marker.source_context.as_deref(), Some("Release 2024-01-15"));
    }

    proptest! {
        #[test]
        fn origin_survives_render_and_parse(
            file in "[A-Za-z][A-Za-z0-9 _-]{0,15}\\.md",
            context in prop::option::of(prop_oneof![
                "[A-Za-z0-9][A-Za-z0-9 .#-]{0,20}",
                "20[0-9]{2}-0[1-9]-[12][0-9]",
            ]),
        ) {
            let marker = ProvenanceMarker::new(&file, context.as_deref());
            let back = ProvenanceMarker::parse(&marker.to_comment()).unwrap();
            prop_assert_eq!(back, marker);
        }
    }

    #[test]
    fn date_context_renders_without_colon() {
        let marker = ProvenanceMarker::new("Log.md", Some("2024-01-15"));
        assert_eq!(marker.to_comment(), "<!-- from Log.md 2024-01-15 -->");
        let heading = ProvenanceMarker::new("Ideas.md", Some("Sync"));
        assert_eq!(heading.to_comment(), "<!-- from Ideas.md: Sync -->");
    }

    #[test]
    fn rejects_other_comments() {
        assert!(matches!(
            ProvenanceMarker::parse("<!-- note to self -->"),
            Err(MarkerError::NotAMarker(_))
        ));
        assert!(ProvenanceMarker::parse("<!-- from -->").is_err());
    }
}
