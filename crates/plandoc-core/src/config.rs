//! Engine configuration

use crate::error::{EngineError, Result};
use plandoc_composition::{PlacementResolver, DEFAULT_FINGERPRINT_LEN, DEFAULT_HEADING_LEVEL};
use plandoc_parser::{Vocabulary, DEFAULT_SLICE_PREFIXES, DEFAULT_TASK_SECTIONS};
use plandoc_review::{DiffEngine, DEFAULT_CONTEXT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Engine configuration
///
/// Every field has a default, so a config file only names what it changes:
///
/// ```toml
/// task_sections = ["Current", "Later", "Done", "Research"]
/// fingerprint_len = 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Headings that open task-list sections
    pub task_sections: Vec<String>,
    /// Heading prefixes that open roadmap slice lists
    pub slice_section_prefixes: Vec<String>,
    /// Characters a deletion fingerprint checks
    pub fingerprint_len: usize,
    /// Context lines around each diff hunk
    pub diff_context: usize,
    /// Heading level of synthesized sections
    pub heading_level: u8,
    /// Parsed documents kept in the cache
    pub cache_capacity: u64,
    /// Seconds a parsed document stays cached; unset keeps it until evicted
    pub cache_ttl_secs: Option<u64>,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML fragment and validate it
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigParse`] for malformed TOML or unknown keys
    /// and [`EngineError::ConfigValue`] for out-of-range values.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// With task-list vocabulary
    #[must_use]
    pub fn with_task_sections<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.task_sections = names.into_iter().map(Into::into).collect();
        self
    }

    /// With fingerprint length
    #[inline]
    #[must_use]
    pub fn with_fingerprint_len(mut self, len: usize) -> Self {
        self.fingerprint_len = len;
        self
    }

    /// With diff context window
    #[inline]
    #[must_use]
    pub fn with_diff_context(mut self, context: usize) -> Self {
        self.diff_context = context;
        self
    }

    /// With synthesized heading level
    #[inline]
    #[must_use]
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level;
        self
    }

    /// With cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// With cache expiry in seconds
    #[inline]
    #[must_use]
    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = Some(secs);
        self
    }

    /// Cache expiry, if configured
    #[must_use]
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigValue`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.fingerprint_len == 0 {
            return Err(EngineError::config_value("fingerprint_len", "must be at least 1"));
        }
        if !(1..=6).contains(&self.heading_level) {
            return Err(EngineError::config_value(
                "heading_level",
                format!("{} is not a markdown heading level", self.heading_level),
            ));
        }
        if self.cache_capacity == 0 {
            return Err(EngineError::config_value("cache_capacity", "must be at least 1"));
        }
        if self.cache_ttl_secs == Some(0) {
            return Err(EngineError::config_value("cache_ttl_secs", "must be at least 1"));
        }
        Ok(())
    }

    /// Section vocabulary for the parser
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Vocabulary`] for blank names or an empty list.
    pub fn vocabulary(&self) -> Result<Vocabulary> {
        Ok(Vocabulary::new(
            &self.task_sections,
            &self.slice_section_prefixes,
        )?)
    }

    /// Placement resolver with this configuration
    #[must_use]
    pub fn resolver(&self) -> PlacementResolver {
        PlacementResolver::new()
            .with_fingerprint_len(self.fingerprint_len)
            .with_heading_level(self.heading_level)
    }

    /// Diff engine with this configuration
    #[must_use]
    pub fn diff_engine(&self) -> DiffEngine {
        DiffEngine::new().with_context(self.diff_context)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            task_sections: DEFAULT_TASK_SECTIONS.iter().map(|s| (*s).to_string()).collect(),
            slice_section_prefixes: DEFAULT_SLICE_PREFIXES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            fingerprint_len: DEFAULT_FINGERPRINT_LEN,
            diff_context: DEFAULT_CONTEXT,
            heading_level: DEFAULT_HEADING_LEVEL,
            cache_capacity: 64,
            cache_ttl_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fingerprint_len, 48);
        assert_eq!(config.diff_context, 2);
        assert!(config.vocabulary().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = EngineConfig::from_toml_str("fingerprint_len = 64\nheading_level = 3\n").unwrap();
        assert_eq!(config.fingerprint_len, 64);
        assert_eq!(config.heading_level, 3);
        assert_eq!(config.task_sections, EngineConfig::default().task_sections);
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("fingerprint = 3"),
            Err(EngineError::ConfigParse(_))
        ));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("heading_level = 9"),
            Err(EngineError::ConfigValue { field: "heading_level", .. })
        ));
        assert!(matches!(
            EngineConfig::new().with_fingerprint_len(0).validate(),
            Err(EngineError::ConfigValue { field: "fingerprint_len", .. })
        ));
    }

    #[test]
    fn cache_ttl_is_optional_and_positive() {
        assert_eq!(EngineConfig::default().cache_ttl(), None);
        let config = EngineConfig::from_toml_str("cache_ttl_secs = 30\n").unwrap();
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(30)));
        assert!(matches!(
            EngineConfig::new().with_cache_ttl_secs(0).validate(),
            Err(EngineError::ConfigValue { field: "cache_ttl_secs", .. })
        ));
    }

    #[test]
    fn empty_vocabulary_is_an_error() {
        let config = EngineConfig::new().with_task_sections(Vec::<String>::new());
        assert!(matches!(config.vocabulary(), Err(EngineError::Vocabulary(_))));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = EngineConfig::new().with_task_sections(["Now", "Next"]).with_diff_context(3);
        let raw = toml::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_toml_str(&raw).unwrap(), config);
    }
}
