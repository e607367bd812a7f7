//! Slice references
//!
//! A task may point at a slice of a roadmap milestone with a trailing
//! `[[<container>#<sliceId> — <label>]]` token. The reference is carried
//! along with the task and never rewritten by the engine.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Separator written between slice id and label
pub const LABEL_SEPARATOR: &str = " — ";

/// Cross-reference into a roadmap document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SliceReference {
    /// Milestone / container section in the roadmap
    pub container: String,
    /// Slice identifier inside the container (e.g. `S2`)
    pub slice_id: String,
    /// Human label, may be empty
    pub label: String,
}

impl SliceReference {
    /// Create a reference
    #[must_use]
    pub fn new(
        container: impl Into<String>,
        slice_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            container: container.into(),
            slice_id: slice_id.into(),
            label: label.into(),
        }
    }

    /// Parse the inner part of a `[[...]]` token
    ///
    /// # Errors
    /// Returns error if the container or slice id is missing
    pub fn parse_inner(inner: &str) -> Result<Self, SliceError> {
        let (container, rest) = inner
            .split_once('#')
            .ok_or_else(|| SliceError::MissingSliceId(inner.to_string()))?;
        let container = container.trim();
        if container.is_empty() {
            return Err(SliceError::MissingContainer(inner.to_string()));
        }

        let (slice_id, label) = ["—", " - ", ":"]
            .iter()
            .find_map(|sep| rest.split_once(sep))
            .unwrap_or((rest, ""));
        let slice_id = slice_id.trim();
        if slice_id.is_empty() {
            return Err(SliceError::MissingSliceId(inner.to_string()));
        }

        Ok(Self::new(container, slice_id, label.trim()))
    }

    /// Render as a `[[...]]` token
    #[must_use]
    pub fn to_token(&self) -> String {
        format!("[[{self}]]")
    }
}

impl Display for SliceReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.container, self.slice_id)?;
        if !self.label.is_empty() {
            write!(f, "{LABEL_SEPARATOR}{}", self.label)?;
        }
        Ok(())
    }
}

impl FromStr for SliceReference {
    type Err = SliceError;

    /// Accepts either the bare inner form or a full `[[...]]` token
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix("[[")
            .and_then(|rest| rest.strip_suffix("]]"))
            .unwrap_or(trimmed);
        Self::parse_inner(inner)
    }
}

/// Errors parsing a slice reference
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SliceError {
    /// No container before `#`
    #[error("slice link has no container: '{0}'")]
    MissingContainer(String),

    /// No `#<id>` part
    #[error("slice link has no slice id: '{0}'")]
    MissingSliceId(String),
}
