//! Plandoc Composition
//!
//! Merges producer proposals into a parsed document without duplicating
//! content or disturbing unrelated structure.
//!
//! # Pipeline
//!
//! - [`ChangeProposal`]: Producer output (harvested task, groomed idea,
//!   commit match, completed-task group)
//! - [`ProvenanceTracker`]: Suppresses proposals whose origin is already
//!   recorded in the document
//! - [`ProposalNormalizer`]: Proposals to [`PlacementSelection`]s
//! - [`PlacementResolver`]: Selections to an [`InsertionPlan`]
//! - [`PatchApplier`]: Applies the plan in descending line order
//!
//! # Example
//!
//! ```rust
//! use plandoc_composition::{
//!     ChangeProposal, Destination, PatchApplier, PlacementResolver, ProposalNormalizer,
//! };
//! use plandoc_parser::DocumentParser;
//!
//! let text = "## Current\n- [ ] Existing\n";
//! let doc = DocumentParser::default().parse(text);
//! let proposals = vec![ChangeProposal::groomed(
//!     "Draft notes",
//!     "Ideas.md",
//!     Some("Docs"),
//!     Destination::section("Current").unwrap(),
//! )];
//!
//! let outcome = ProposalNormalizer::new().normalize(&proposals);
//! let plan = PlacementResolver::new().resolve(&doc, &outcome.selections);
//! let patched = PatchApplier::new().apply(text, &plan);
//! assert_eq!(
//!     patched.text,
//!     "## Current\n- [ ] Existing\n- [ ] Draft notes <!-- from Ideas.md: Docs -->\n"
//! );
//! ```

#![warn(unreachable_pub)]

mod applier;
mod error;
mod normalize;
mod plan;
mod proposal;
mod resolver;
mod selection;
mod tracker;

pub use applier::{ApplyOutcome, ApplyReport, ApplySkip, PatchApplier, SkippedDirective};
pub use error::ProposalError;
pub use normalize::{NormalizeOutcome, ProposalNormalizer, ProposalOverride};
pub use plan::{
    Directive, InsertionPlan, MoveGroup, PlannedLine, SkipReason, SkippedSelection,
};
pub use proposal::{
    parse_batch, ChangeProposal, Destination, ProducerKind, ProposalBatch, ProposalId,
    RejectedProposal,
};
pub use resolver::{PlacementResolver, DEFAULT_FINGERPRINT_LEN, DEFAULT_HEADING_LEVEL};
pub use selection::PlacementSelection;
pub use tracker::{HistoryEntry, ProvenanceTracker};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
