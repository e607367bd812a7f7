//! Plandoc Artifact Model
//!
//! Addressable structure of plain-text planning documents.
//!
//! # Core Concepts
//!
//! - [`Document`]: Ordered, contiguous [`Section`]s covering a whole file
//! - [`TaskItem`]: Checkbox line owned by a task-list section
//! - [`SliceReference`]: `[[Milestone#S2 — Label]]` link into a roadmap
//! - [`ProvenanceMarker`]: `<!-- from Log.md 2024-01-15 -->` origin tag
//! - [`ContentHash`] / [`Fingerprint`]: Staleness checks for whole texts and line ranges
//!
//! # Example
//!
//! ```rust
//! use plandoc_artifact::{parse_task_line, ProvenanceMarker};
//!
//! let task = parse_task_line("- [ ] Fix bug <!-- from Log.md 2024-01-15 -->").unwrap();
//! assert_eq!(task.text, "Fix bug");
//! assert!(task
//!     .provenance
//!     .unwrap()
//!     .same_origin(&ProvenanceMarker::new("Log.md", Some("2024-01-15"))));
//! ```

#![warn(unreachable_pub)]

mod document;
mod hash;
mod line;
mod name;
mod provenance;
mod slice;

pub use document::{
    join_lines, normalize_text, split_lines, Document, ParseDiagnostic, Section, SectionKind,
    SliceEntry, TaskItem,
};
pub use hash::{ContentHash, Fingerprint, HashError};
pub use line::{classify_line, parse_task_line, LineClass, TaskLine};
pub use name::{NameError, SectionName};
pub use provenance::{MarkerError, ProvenanceMarker};
pub use slice::{SliceError, SliceReference, LABEL_SEPARATOR};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
