//! Content hashing and line-range fingerprints
//!
//! [`ContentHash`] identifies a whole document text (used to detect that a
//! plan or review block is being applied to text it was not computed from).
//! [`Fingerprint`] identifies a single line range cheaply, so a stale
//! deletion can be detected without rehashing the document.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte Blake3 hash of document text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create a hash from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hash arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Hash a document text
    #[inline]
    #[must_use]
    pub fn of_text(text: &str) -> Self {
        Self::compute(text.as_bytes())
    }

    /// Build a hash from a byte slice
    ///
    /// # Errors
    /// Returns error if the slice is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, HashError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| HashError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// First 16 hex characters
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ContentHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(&hex::decode(s)?)
    }
}

impl Serialize for ContentHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors when decoding a content hash
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Wrong number of bytes
    #[error("invalid hash length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Not valid hex
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

/// Leading characters of a line range, captured when a deletion is planned
///
/// The range's lines are joined with `\n` and truncated to `len` characters
/// (not bytes). Two fingerprints match only if both the captured prefix and
/// the number of lines are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    prefix: String,
    len: usize,
    line_count: usize,
}

impl Fingerprint {
    /// Capture a fingerprint of `lines`
    #[must_use]
    pub fn capture<S: AsRef<str>>(lines: &[S], len: usize) -> Self {
        let joined = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            prefix: joined.chars().take(len).collect(),
            len,
            line_count: lines.len(),
        }
    }

    /// Check the fingerprint against the current content of a range
    #[must_use]
    pub fn matches<S: AsRef<str>>(&self, lines: &[S]) -> bool {
        lines.len() == self.line_count && Self::capture(lines, self.len).prefix == self.prefix
    }

    /// Captured prefix
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of lines the range spanned
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_count
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({} lines)", self.prefix, self.line_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(ContentHash::of_text("a\nb"), ContentHash::of_text("a\nb"));
        assert_ne!(ContentHash::of_text("a\nb"), ContentHash::of_text("a\nc"));
    }

    #[test]
    fn hash_display_parse_roundtrip() {
        let hash = ContentHash::of_text("roadmap");
        let parsed: ContentHash = hash.to_string().parse().unwrap();
        assert_eq!(hash, parsed);
        assert!(hash.to_string().starts_with(&hash.short()));
    }

    #[test]
    fn hash_from_slice_rejects_short_input() {
        let result = ContentHash::from_slice(&[0u8; 12]);
        assert!(matches!(
            result,
            Err(HashError::InvalidLength {
                expected: 32,
                actual: 12
            })
        ));
    }

    #[test]
    fn hash_serializes_as_hex_string() {
        let hash = ContentHash::of_text("x");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json.len(), 66);
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn fingerprint_truncates_on_chars() {
        let fp = Fingerprint::capture(&["- [ ] Ship v1 — launch"], 12);
        assert_eq!(fp.prefix(), "- [ ] Ship v");
        assert_eq!(fp.line_count(), 1);
    }

    #[test]
    fn fingerprint_matches_same_prefix() {
        let fp = Fingerprint::capture(&["- [ ] Ship v1 <!-- from Ideas.md -->"], 10);
        assert!(fp.matches(&["- [ ] Ship v1 but edited later"]));
        assert!(!fp.matches(&["- [x] Ship v1"]));
    }

    #[test]
    fn fingerprint_detects_growth_of_short_line() {
        let fp = Fingerprint::capture(&["- [ ] A"], 48);
        assert!(!fp.matches(&["- [ ] A and more"]));
    }

    #[test]
    fn fingerprint_checks_line_count() {
        let fp = Fingerprint::capture(&["a", "b"], 48);
        assert!(fp.matches(&["a", "b"]));
        assert!(!fp.matches(&["a"]));
    }
}
