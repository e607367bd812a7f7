//! Producer proposals
//!
//! Every producer (harvester, groomer, commit matcher, archiver, promoter)
//! hands the engine a [`ChangeProposal`]. The four producer shapes share one
//! struct and differ only in their [`ProducerKind`] payload.

use crate::error::ProposalError;
use chrono::NaiveDate;
use plandoc_artifact::{
    normalize_text, ContentHash, ProvenanceMarker, SectionName, SliceReference,
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Stable proposal identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(String);

impl ProposalId {
    /// Wrap an id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProposalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a proposal should land
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Destination {
    /// A named section
    Section(SectionName),
    /// Dropped by the reviewer
    Discard,
}

impl Destination {
    /// Section destination from raw heading text
    ///
    /// # Errors
    /// Returns error if the name is blank
    pub fn section(raw: &str) -> Result<Self, ProposalError> {
        raw.parse()
    }

    /// Target section, `None` for discards
    #[inline]
    #[must_use]
    pub fn section_name(&self) -> Option<&SectionName> {
        match self {
            Self::Section(name) => Some(name),
            Self::Discard => None,
        }
    }

    /// Whether this is a discard
    #[inline]
    #[must_use]
    pub fn is_discard(&self) -> bool {
        matches!(self, Self::Discard)
    }
}

impl Display for Destination {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Section(name) => Display::fmt(name, f),
            Self::Discard => f.write_str("discard"),
        }
    }
}

impl FromStr for Destination {
    type Err = ProposalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("discard") {
            return Ok(Self::Discard);
        }
        SectionName::new(trimmed)
            .map(Self::Section)
            .map_err(|_| ProposalError::InvalidDestination(s.to_string()))
    }
}

impl TryFrom<String> for Destination {
    type Error = ProposalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Destination> for String {
    fn from(value: Destination) -> Self {
        value.to_string()
    }
}

impl From<SectionName> for Destination {
    fn from(value: SectionName) -> Self {
        Self::Section(value)
    }
}

/// Producer-specific payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProducerKind {
    /// Task harvested from a dated log entry
    HarvestedTask {
        /// Log entry date
        date: Option<NaiveDate>,
    },
    /// Idea groomed from an ideas document
    GroomedIdea {
        /// Heading the idea was found under
        heading: Option<String>,
    },
    /// Existing task matched to a commit
    CommitMatch {
        /// Commit identifier
        commit: String,
    },
    /// Group of completed tasks to archive
    CompletedTaskGroup {
        /// Task texts in the group
        items: Vec<String>,
    },
}

impl ProducerKind {
    /// Short tag used in ids and logs
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::HarvestedTask { .. } => "harvestedTask",
            Self::GroomedIdea { .. } => "groomedIdea",
            Self::CommitMatch { .. } => "commitMatch",
            Self::CompletedTaskGroup { .. } => "completedTaskGroup",
        }
    }

    /// Context implied by the payload when the producer gave none
    fn implied_context(&self) -> Option<String> {
        match self {
            Self::HarvestedTask { date } => date.map(|d| d.format("%Y-%m-%d").to_string()),
            Self::GroomedIdea { heading } => heading.clone(),
            Self::CommitMatch { commit } => Some(commit.clone()),
            Self::CompletedTaskGroup { .. } => None,
        }
    }

    /// Whether applying the proposal completes the item
    #[must_use]
    pub fn marks_done(&self) -> bool {
        matches!(self, Self::CommitMatch { .. } | Self::CompletedTaskGroup { .. })
    }
}

/// A producer's suggested edit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeProposal {
    /// Proposal id
    pub id: ProposalId,
    /// Producer payload
    #[serde(flatten)]
    pub kind: ProducerKind,
    /// Proposed task text
    pub text: String,
    /// Producer input file
    pub source_file: String,
    /// Heading, date or commit the text came from
    pub source_context: Option<String>,
    /// Suggested destination
    pub suggested_destination: Destination,
    /// Suggested slice link
    pub suggested_slice_link: Option<SliceReference>,
    /// Producer's explanation
    pub reasoning: Option<String>,
    /// Text of an existing item this proposal refers to
    pub existing_similar: Option<String>,
    /// Quote from the source
    pub source_quote: Option<String>,
    /// Producer confidence in `0.0..=1.0`
    pub confidence: Option<f32>,
    /// Move `existing_similar` instead of inserting a copy
    pub promote: bool,
    /// Secondary destination that also receives the item
    pub also_keep_in: Option<SectionName>,
}

impl ChangeProposal {
    /// Create a proposal with a derived id
    ///
    /// An absent `source_context` is filled from the payload (log date, idea
    /// heading, commit id).
    #[must_use]
    pub fn new(
        kind: ProducerKind,
        text: impl Into<String>,
        source_file: impl Into<String>,
        source_context: Option<String>,
        destination: Destination,
    ) -> Self {
        let source_context = source_context
            .filter(|c| !c.trim().is_empty())
            .or_else(|| kind.implied_context());
        let mut proposal = Self {
            id: ProposalId::new(String::new()),
            kind,
            text: text.into(),
            source_file: source_file.into(),
            source_context,
            suggested_destination: destination,
            suggested_slice_link: None,
            reasoning: None,
            existing_similar: None,
            source_quote: None,
            confidence: None,
            promote: false,
            also_keep_in: None,
        };
        proposal.id = proposal.derived_id();
        proposal
    }

    /// Task harvested from a log entry
    #[must_use]
    pub fn harvested(
        text: impl Into<String>,
        source_file: impl Into<String>,
        date: Option<NaiveDate>,
        destination: Destination,
    ) -> Self {
        Self::new(
            ProducerKind::HarvestedTask { date },
            text,
            source_file,
            None,
            destination,
        )
    }

    /// Idea groomed from an ideas document
    #[must_use]
    pub fn groomed(
        text: impl Into<String>,
        source_file: impl Into<String>,
        heading: Option<&str>,
        destination: Destination,
    ) -> Self {
        Self::new(
            ProducerKind::GroomedIdea {
                heading: heading.map(str::to_string),
            },
            text,
            source_file,
            None,
            destination,
        )
    }

    /// Existing task completed by a commit
    #[must_use]
    pub fn commit_match(
        existing: impl Into<String>,
        source_file: impl Into<String>,
        commit: impl Into<String>,
        destination: Destination,
    ) -> Self {
        let existing = existing.into();
        let mut proposal = Self::new(
            ProducerKind::CommitMatch {
                commit: commit.into(),
            },
            existing.clone(),
            source_file,
            None,
            destination,
        );
        proposal.existing_similar = Some(existing);
        proposal
    }

    /// Group of completed tasks moved together
    #[must_use]
    pub fn completed_group<I, S>(
        group: impl Into<String>,
        source_file: impl Into<String>,
        items: I,
        destination: Destination,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            ProducerKind::CompletedTaskGroup {
                items: items.into_iter().map(Into::into).collect(),
            },
            group,
            source_file,
            None,
            destination,
        )
    }

    /// Replace the id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = ProposalId::new(id);
        self
    }

    /// Set the source context (the id is kept)
    #[inline]
    #[must_use]
    pub fn with_source_context(mut self, context: impl Into<String>) -> Self {
        self.source_context = Some(context.into());
        self
    }

    /// Set the suggested slice link
    #[inline]
    #[must_use]
    pub fn with_slice_link(mut self, link: SliceReference) -> Self {
        self.suggested_slice_link = Some(link);
        self
    }

    /// Set the producer's reasoning
    #[inline]
    #[must_use]
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    /// Move `existing` into the destination instead of inserting a copy
    #[inline]
    #[must_use]
    pub fn promoting(mut self, existing: impl Into<String>) -> Self {
        self.existing_similar = Some(existing.into());
        self.promote = true;
        self
    }

    /// Also place the item in a second section
    #[inline]
    #[must_use]
    pub fn also_keep_in(mut self, section: SectionName) -> Self {
        self.also_keep_in = Some(section);
        self
    }

    /// Origin recorded in the provenance marker
    #[must_use]
    pub fn origin(&self) -> ProvenanceMarker {
        ProvenanceMarker::new(&self.source_file, self.source_context.as_deref())
    }

    /// Whether the proposal relocates an existing item
    #[must_use]
    pub fn is_move(&self) -> bool {
        self.existing_similar.is_some() && (self.promote || self.kind.marks_done())
    }

    /// Texts placed by this proposal (group members, or the text itself)
    #[must_use]
    pub fn item_texts(&self) -> Vec<&str> {
        match &self.kind {
            ProducerKind::CompletedTaskGroup { items } if !items.is_empty() => {
                items.iter().map(String::as_str).collect()
            }
            _ => vec![self.text.as_str()],
        }
    }

    /// Copy without the given group members, keeping the id
    ///
    /// Only completed-task groups have members to drop; any other proposal
    /// is returned unchanged.
    #[must_use]
    pub fn without_items(&self, placed: &[&str]) -> Self {
        let mut narrowed = self.clone();
        if let ProducerKind::CompletedTaskGroup { items } = &mut narrowed.kind {
            let placed: Vec<String> = placed.iter().map(|text| normalize_text(text)).collect();
            items.retain(|item| !placed.contains(&normalize_text(item)));
        }
        narrowed
    }

    /// Check required fields
    ///
    /// # Errors
    /// Returns error naming the first blank required field
    pub fn validate(&self) -> Result<(), ProposalError> {
        if self.text.trim().is_empty() {
            return Err(ProposalError::EmptyField("text"));
        }
        if self.source_file.trim().is_empty() {
            return Err(ProposalError::EmptyField("sourceFile"));
        }
        if self.source_file.contains(':') || self.source_file.contains("-->") {
            return Err(ProposalError::InvalidSourceFile(self.source_file.clone()));
        }
        if let ProducerKind::CommitMatch { commit } = &self.kind {
            if commit.trim().is_empty() {
                return Err(ProposalError::EmptyField("commit"));
            }
        }
        if let Some(confidence) = self.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(ProposalError::InvalidConfidence(confidence));
            }
        }
        Ok(())
    }

    /// Parse one proposal from producer JSON
    ///
    /// # Errors
    /// Returns error if the JSON is not a valid proposal
    pub fn from_json(json: &str) -> Result<Self, ProposalError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Convert an already-parsed JSON value
    ///
    /// # Errors
    /// Returns error if the value is not a valid proposal
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProposalError> {
        let raw: RawProposal = serde_json::from_value(value)?;
        raw.into_proposal()
    }

    fn derived_id(&self) -> ProposalId {
        let key = [
            self.kind.tag(),
            self.source_file.as_str(),
            self.source_context.as_deref().unwrap_or(""),
            self.text.as_str(),
        ]
        .join("\u{1f}");
        ProposalId::new(format!("p-{}", ContentHash::of_text(&key).short()))
    }
}

/// A proposal dropped from a batch
#[derive(Debug)]
pub struct RejectedProposal {
    /// Proposal id, or `#<index>` when the producer gave none
    pub id: ProposalId,
    /// Why it was dropped
    pub reason: ProposalError,
}

/// Proposals read from one producer payload
#[derive(Debug, Default)]
pub struct ProposalBatch {
    /// Well-formed proposals in input order
    pub proposals: Vec<ChangeProposal>,
    /// Malformed entries
    pub rejected: Vec<RejectedProposal>,
}

/// Parse a batch of producer proposals
///
/// Accepts a JSON array or an object with a `proposals` array. Malformed
/// entries are dropped with a reason; the rest of the batch is kept.
///
/// # Errors
/// Returns error only if the payload itself is not JSON of either shape
pub fn parse_batch(json: &str) -> Result<ProposalBatch, ProposalError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let entries = match value {
        serde_json::Value::Array(entries) => entries,
        serde_json::Value::Object(mut map) => match map.remove("proposals") {
            Some(serde_json::Value::Array(entries)) => entries,
            _ => return Err(ProposalError::NotABatch),
        },
        _ => return Err(ProposalError::NotABatch),
    };

    let mut batch = ProposalBatch::default();
    for (index, entry) in entries.into_iter().enumerate() {
        let fallback_id = entry
            .get("id")
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| format!("#{index}"), str::to_string);
        match ChangeProposal::from_value(entry) {
            Ok(proposal) => batch.proposals.push(proposal),
            Err(reason) => batch.rejected.push(RejectedProposal {
                id: ProposalId::new(fallback_id),
                reason,
            }),
        }
    }
    Ok(batch)
}

/// Wire shape of a producer proposal
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProposal {
    id: Option<String>,
    kind: Option<String>,
    text: Option<String>,
    source_file: Option<String>,
    source_context: Option<String>,
    suggested_destination: Option<String>,
    suggested_slice_link: Option<String>,
    reasoning: Option<String>,
    existing_similar: Option<String>,
    source_quote: Option<String>,
    confidence: Option<f32>,
    heading: Option<String>,
    date: Option<String>,
    commit: Option<String>,
    items: Option<Vec<String>>,
    #[serde(default)]
    promote: bool,
    also_keep_in: Option<String>,
}

impl RawProposal {
    fn into_proposal(self) -> Result<ChangeProposal, ProposalError> {
        let text = self.text.ok_or(ProposalError::MissingField("text"))?;
        let source_file = self
            .source_file
            .ok_or(ProposalError::MissingField("sourceFile"))?;
        let destination: Destination = self
            .suggested_destination
            .ok_or(ProposalError::MissingField("suggestedDestination"))?
            .parse()?;

        let date = self
            .date
            .map(|d| {
                NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
                    .map_err(|_| ProposalError::InvalidDate(d))
            })
            .transpose()?;

        let kind = match self.kind.as_deref() {
            Some("harvestedTask" | "harvested") => ProducerKind::HarvestedTask { date },
            Some("groomedIdea" | "idea") => ProducerKind::GroomedIdea {
                heading: self.heading,
            },
            Some("commitMatch" | "commit") => ProducerKind::CommitMatch {
                commit: self.commit.ok_or(ProposalError::MissingField("commit"))?,
            },
            Some("completedTaskGroup" | "completedGroup") => ProducerKind::CompletedTaskGroup {
                items: self.items.unwrap_or_default(),
            },
            Some(other) => return Err(ProposalError::UnknownKind(other.to_string())),
            None => match (self.commit, self.items, self.heading) {
                (Some(commit), _, _) => ProducerKind::CommitMatch { commit },
                (None, Some(items), _) => ProducerKind::CompletedTaskGroup { items },
                (None, None, Some(heading)) => ProducerKind::GroomedIdea {
                    heading: Some(heading),
                },
                (None, None, None) => ProducerKind::HarvestedTask { date },
            },
        };

        let mut proposal =
            ChangeProposal::new(kind, text, source_file, self.source_context, destination);
        if let Some(id) = self.id.filter(|id| !id.trim().is_empty()) {
            proposal.id = ProposalId::new(id);
        }
        proposal.suggested_slice_link = self
            .suggested_slice_link
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.parse::<SliceReference>())
            .transpose()?;
        proposal.reasoning = self.reasoning;
        proposal.existing_similar = self.existing_similar.filter(|s| !s.trim().is_empty());
        proposal.source_quote = self.source_quote;
        proposal.confidence = self.confidence;
        proposal.promote = self.promote;
        proposal.also_keep_in = self
            .also_keep_in
            .map(|s| SectionName::new(&s).map_err(|_| ProposalError::InvalidDestination(s)))
            .transpose()?;

        if proposal.promote || matches!(proposal.kind, ProducerKind::CommitMatch { .. }) {
            proposal
                .existing_similar
                .get_or_insert_with(|| proposal.text.clone());
        }

        proposal.validate()?;
        Ok(proposal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current() -> Destination {
        Destination::section("Current").unwrap()
    }

    #[test]
    fn destination_parses_discard() {
        assert_eq!("Discard".parse::<Destination>().unwrap(), Destination::Discard);
        assert_eq!(
            "future tasks".parse::<Destination>().unwrap().to_string(),
            "future tasks"
        );
        assert!(" ".parse::<Destination>().is_err());
    }

    #[test]
    fn harvested_context_comes_from_date() {
        let p = ChangeProposal::harvested(
            "Fix bug",
            "Log.md",
            NaiveDate::from_ymd_opt(2024, 1, 15),
            current(),
        );
        assert_eq!(p.source_context.as_deref(), Some("2024-01-15"));
        assert_eq!(p.origin().to_comment(), "<!-- from Log.md 2024-01-15 -->");
    }

    #[test]
    fn derived_ids_are_stable_and_distinct() {
        let a = ChangeProposal::groomed("Sync", "Ideas.md", Some("Offline"), current());
        let b = ChangeProposal::groomed("Sync", "Ideas.md", Some("Offline"), current());
        let c = ChangeProposal::groomed("Export", "Ideas.md", Some("Offline"), current());
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert!(a.id.as_str().starts_with("p-"));
    }

    #[test]
    fn from_json_reads_full_schema() {
        let p = ChangeProposal::from_json(
            r#"{
                "id": "h1",
                "text": "Write README",
                "sourceFile": "Log.md",
                "sourceContext": null,
                "date": "2024-02-01",
                "suggestedDestination": "Current",
                "suggestedSliceLink": "Milestone 1#S1 — Docs",
                "reasoning": "mentioned twice",
                "existingSimilar": null,
                "confidence": 0.9
            }"#,
        )
        .unwrap();
        assert_eq!(p.id.as_str(), "h1");
        assert_eq!(
            p.kind,
            ProducerKind::HarvestedTask {
                date: NaiveDate::from_ymd_opt(2024, 2, 1)
            }
        );
        assert_eq!(p.source_context.as_deref(), Some("2024-02-01"));
        assert_eq!(p.suggested_slice_link.as_ref().unwrap().slice_id, "S1");
        assert!(!p.is_move());
    }

    #[test]
    fn kind_is_inferred_from_payload_fields() {
        let commit = ChangeProposal::from_json(
            r#"{"text":"Ship v1","sourceFile":"git","commit":"abc123","suggestedDestination":"Done"}"#,
        )
        .unwrap();
        assert!(matches!(commit.kind, ProducerKind::CommitMatch { .. }));
        assert_eq!(commit.existing_similar.as_deref(), Some("Ship v1"));
        assert!(commit.is_move());

        let idea = ChangeProposal::from_json(
            r#"{"text":"Dark mode","sourceFile":"Ideas.md","heading":"UI","suggestedDestination":"Later"}"#,
        )
        .unwrap();
        assert_eq!(idea.source_context.as_deref(), Some("UI"));
    }

    #[test]
    fn promotion_defaults_existing_to_text() {
        let p = ChangeProposal::from_json(
            r#"{"text":"Ship v1","sourceFile":"Roadmap.md","promote":true,"suggestedDestination":"Current"}"#,
        )
        .unwrap();
        assert!(p.is_move());
        assert_eq!(p.existing_similar.as_deref(), Some("Ship v1"));
    }

    #[test]
    fn malformed_proposals_name_the_field() {
        let missing = ChangeProposal::from_json(r#"{"sourceFile":"Log.md","suggestedDestination":"Current"}"#);
        assert!(matches!(missing, Err(ProposalError::MissingField("text"))));

        let blank = ChangeProposal::from_json(
            r#"{"text":"  ","sourceFile":"Log.md","suggestedDestination":"Current"}"#,
        );
        assert!(matches!(blank, Err(ProposalError::EmptyField("text"))));

        let kind = ChangeProposal::from_json(
            r#"{"kind":"poem","text":"x","sourceFile":"a","suggestedDestination":"Current"}"#,
        );
        assert!(matches!(kind, Err(ProposalError::UnknownKind(_))));

        let date = ChangeProposal::from_json(
            r#"{"text":"x","sourceFile":"a","date":"15/01/2024","suggestedDestination":"Current"}"#,
        );
        assert!(matches!(date, Err(ProposalError::InvalidDate(_))));

        let colon = ChangeProposal::from_json(
            r#"{"text":"x","sourceFile":"C:notes.md","suggestedDestination":"Current"}"#,
        );
        assert!(matches!(colon, Err(ProposalError::InvalidSourceFile(_))));
    }

    #[test]
    fn without_items_narrows_groups_only() {
        let group = ChangeProposal::completed_group("Week 3", "Current.md", ["A", "B  c"], current());
        let narrowed = group.without_items(&["B c"]);
        assert_eq!(narrowed.item_texts(), vec!["A"]);
        assert_eq!(narrowed.id, group.id);

        let single = ChangeProposal::groomed("A", "Ideas.md", None, current());
        assert_eq!(single.without_items(&["A"]).item_texts(), vec!["A"]);
    }

    #[test]
    fn source_file_with_spaces_is_valid() {
        let proposal = ChangeProposal::groomed("Call vendor", "Daily Log.md", Some("Standup"), current());
        assert!(proposal.validate().is_ok());
        assert_eq!(proposal.origin().to_comment(), "<!-- from Daily Log.md: Standup -->");
    }

    #[test]
    fn batch_keeps_good_entries() {
        let batch = parse_batch(
            r#"{"proposals": [
                {"id":"a","text":"One","sourceFile":"Log.md","suggestedDestination":"Current"},
                {"id":"b","sourceFile":"Log.md","suggestedDestination":"Current"},
                {"text":"Three","sourceFile":"Log.md","suggestedDestination":"Later","confidence":3.0},
                {"text":"Four","sourceFile":"Log.md","suggestedDestination":"discard"}
            ]}"#,
        )
        .unwrap();
        let ids: Vec<_> = batch.proposals.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], "a");
        let rejected: Vec<_> = batch.rejected.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(rejected, vec!["b", "#2"]);
        assert!(batch.proposals[1].suggested_destination.is_discard());
    }

    #[test]
    fn batch_rejects_non_list_payload() {
        assert!(matches!(parse_batch("42"), Err(ProposalError::NotABatch)));
        assert!(matches!(parse_batch("{oops"), Err(ProposalError::Json(_))));
    }

    #[test]
    fn group_items_are_placed_individually() {
        let p = ChangeProposal::completed_group(
            "Sprint 3",
            "Current.md",
            ["A", "B"],
            Destination::section("Done").unwrap(),
        );
        assert_eq!(p.item_texts(), vec!["A", "B"]);
        assert!(p.kind.marks_done());
    }
}
