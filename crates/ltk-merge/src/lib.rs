//! ltk-merge
//!
//! Merge engine for the combined orders + enrollments activity timeline.
//!
//! Architectural decisions:
//! - Timeline order is `created_on` descending; ties break on `(kind, id)` ascending
//! - Items deduplicate by `(kind, id)`; ids never deduplicate across kinds
//! - A prefix counts as stable only after an unchanged iteration-over-iteration
//!   comparison, never by assumption
//! - The proven prefix length only ever grows
//!
//! Deterministic, pure logic. No IO. No clock. No network calls.

mod engine;
mod stable;
mod stack;

pub use engine::{evaluate_iteration, prefix_proven, MergeDecision};
pub use stable::StablePrefix;
pub use stack::MergedStack;
