//! Section names
//!
//! Provides [`SectionName`], the address of a top-level section inside a
//! document. Headings are matched case-insensitively and with collapsed
//! whitespace, so `## future  tasks` and `## Future Tasks` name the same
//! section while the heading keeps its original spelling on disk.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Name of a document section as written in its heading
///
/// Equality, ordering and hashing use the normalized key; [`Display`]
/// preserves the original spelling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SectionName {
    display: String,
    key: String,
}

impl SectionName {
    /// Create a name from heading text
    ///
    /// # Errors
    /// Returns error if the name is empty after trimming
    pub fn new(raw: impl AsRef<str>) -> Result<Self, NameError> {
        let display = raw
            .as_ref()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if display.is_empty() {
            return Err(NameError::Empty);
        }
        let key = display.to_lowercase();
        Ok(Self { display, key })
    }

    /// Name of the synthetic section covering lines before the first heading
    #[inline]
    #[must_use]
    pub fn preamble() -> Self {
        Self {
            display: String::new(),
            key: String::new(),
        }
    }

    /// Whether this is the preamble name
    #[inline]
    #[must_use]
    pub fn is_preamble(&self) -> bool {
        self.key.is_empty()
    }

    /// Original spelling
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Normalized comparison key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Case-insensitive comparison against raw heading text
    #[must_use]
    pub fn matches(&self, raw: &str) -> bool {
        Self::new(raw).is_ok_and(|other| other == *self)
    }

    /// Whether the name starts with `prefix` (case-insensitive, word boundary)
    #[must_use]
    pub fn starts_with_word(&self, prefix: &str) -> bool {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() || !self.key.starts_with(&prefix) {
            return false;
        }
        self.key[prefix.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric())
    }
}

impl PartialEq for SectionName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for SectionName {}

impl Hash for SectionName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for SectionName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SectionName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

impl Display for SectionName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl FromStr for SectionName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SectionName {
    type Error = NameError;

    /// Blank input yields the preamble name
    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Ok(Self::preamble());
        }
        Self::new(value)
    }
}

impl From<SectionName> for String {
    fn from(value: SectionName) -> Self {
        value.display
    }
}

/// Errors related to section names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// Heading text was blank
    #[error("section name cannot be empty")]
    Empty,
}
