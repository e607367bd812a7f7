//! Plandoc Document Parser
//!
//! Turns raw task and roadmap text into an addressable
//! [`Document`](plandoc_artifact::Document):
//! - Sections opened by recognized headings ([`Vocabulary`])
//! - Checkbox tasks with slice links and provenance markers
//! - Roadmap slice entries
//! - Diagnostics for lines that could not be classified
//!
//! Parsed documents can be memoized by content hash with [`DocumentCache`].

#![warn(unreachable_pub)]

mod cache;
mod error;
mod parser;
mod vocabulary;

pub use cache::{CacheStats, DocumentCache};
pub use error::VocabularyError;
pub use parser::DocumentParser;
pub use vocabulary::{Vocabulary, DEFAULT_SLICE_PREFIXES, DEFAULT_TASK_SECTIONS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
