//! Heading vocabulary
//!
//! Decides which headings open task-list and slice-list sections.

use crate::error::VocabularyError;
use plandoc_artifact::{SectionKind, SectionName};

/// Default task-list section names
pub const DEFAULT_TASK_SECTIONS: &[&str] = &[
    "Current",
    "Later",
    "Blocked",
    "Done",
    "Future Tasks",
    "Archive",
    "Ideas",
];

/// Default heading prefixes of roadmap slice lists
pub const DEFAULT_SLICE_PREFIXES: &[&str] = &["Milestone", "Slices"];

/// Recognized section headings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    task_sections: Vec<SectionName>,
    slice_prefixes: Vec<String>,
}

impl Vocabulary {
    /// Build a vocabulary from raw names
    ///
    /// # Errors
    /// Returns error if a name or prefix is blank, or no task section is given
    pub fn new<I, S, P, T>(task_sections: I, slice_prefixes: P) -> Result<Self, VocabularyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        P: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut names = Vec::new();
        for raw in task_sections {
            let name = SectionName::new(raw)?;
            if !names.contains(&name) {
                names.push(name);
            }
        }
        if names.is_empty() {
            return Err(VocabularyError::NoTaskSections);
        }

        let prefixes = slice_prefixes
            .into_iter()
            .map(|p| {
                let p = p.as_ref().trim();
                if p.is_empty() {
                    Err(VocabularyError::EmptySlicePrefix)
                } else {
                    Ok(p.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            task_sections: names,
            slice_prefixes: prefixes,
        })
    }

    /// Add a task-list name (e.g. a section synthesized by a producer)
    #[must_use]
    pub fn with_task_section(mut self, name: SectionName) -> Self {
        if !name.is_preamble() && !self.task_sections.contains(&name) {
            self.task_sections.push(name);
        }
        self
    }

    /// Recognized task-list names
    #[inline]
    #[must_use]
    pub fn task_sections(&self) -> &[SectionName] {
        &self.task_sections
    }

    /// Slice-list heading prefixes
    #[inline]
    #[must_use]
    pub fn slice_prefixes(&self) -> &[String] {
        &self.slice_prefixes
    }

    /// Whether a heading names a task list
    #[must_use]
    pub fn is_task_section(&self, name: &SectionName) -> bool {
        self.task_sections.contains(name)
    }

    /// Kind of section a heading opens, if it opens one
    ///
    /// Task-list names open a section at any level. Other headings only
    /// open a section at level 1 or 2.
    #[must_use]
    pub fn classify(&self, name: &SectionName, level: u8) -> Option<SectionKind> {
        if self.is_task_section(name) {
            Some(SectionKind::TaskList)
        } else if level > 2 {
            None
        } else if self
            .slice_prefixes
            .iter()
            .any(|prefix| name.starts_with_word(prefix))
        {
            Some(SectionKind::SliceList)
        } else {
            Some(SectionKind::Freeform)
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            task_sections: DEFAULT_TASK_SECTIONS
                .iter()
                .filter_map(|raw| SectionName::new(raw).ok())
                .collect(),
            slice_prefixes: DEFAULT_SLICE_PREFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}
