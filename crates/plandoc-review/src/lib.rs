//! Plandoc Review
//!
//! Diff previews for proposed document changes. Each touched document gets
//! one [`DiffBlock`] whose hunks a reviewer accepts or rejects
//! independently; unreviewed hunks are never applied.
//!
//! # Example
//!
//! ```rust
//! use plandoc_review::DiffEngine;
//!
//! let mut block = DiffEngine::new().diff("## Current\n", "## Current\n- [ ] Write README\n");
//! assert_eq!(block.apply_accepted(), "## Current\n");
//! block.accept_all();
//! assert_eq!(block.apply_accepted(), "## Current\n- [ ] Write README\n");
//! ```

#![warn(unreachable_pub)]

mod diff;
mod error;
mod session;

pub use diff::{
    CommitResult, DiffBlock, DiffEngine, DiffHunk, DiffLine, HunkStatus, StaleHunk,
    DEFAULT_CONTEXT,
};
pub use error::ReviewError;
pub use session::ReviewSession;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
