//! Plandoc Core
//!
//! Merges machine-proposed tasks into human-curated planning documents
//! without duplicating content, losing items, or disturbing structure the
//! engine does not recognize.
//!
//! # Components
//!
//! - [`Reconciler`]: parse, suppress, normalize, resolve, apply
//! - [`DocumentStore`]: file I/O with one apply queue per document
//! - [`EngineConfig`]: vocabulary and tuning knobs, loadable from TOML
//! - [`ReconcileReport`]: everything a batch recovered from
//!
//! # Example
//!
//! ```rust
//! use plandoc_core::{EngineConfig, Reconciler};
//! use plandoc_core::composition::{ChangeProposal, Destination, ProposalNormalizer};
//!
//! let reconciler = Reconciler::new(EngineConfig::default()).unwrap();
//! let proposal = ChangeProposal::groomed(
//!     "Write README",
//!     "Ideas.md",
//!     Some("Docs"),
//!     Destination::section("Current").unwrap(),
//! );
//! let result = reconciler.reconcile("## Current\n", &[proposal], &ProposalNormalizer::new());
//! assert_eq!(result.text, "## Current\n- [ ] Write README <!-- from Ideas.md: Docs -->\n");
//! ```

#![warn(unreachable_pub)]

mod config;
mod error;
mod reconciler;
mod report;
mod store;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use reconciler::{Reconciler, Reconciliation};
pub use report::{ReconcileReport, Rejection, SuppressedProposal};
pub use store::DocumentStore;

pub use plandoc_artifact as artifact;
pub use plandoc_composition as composition;
pub use plandoc_parser as parser;
pub use plandoc_review as review;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
