//! ltk-engine
//!
//! Paginated dual-collection reconciler: presents a stable, growing prefix of
//! the combined orders + enrollments timeline while both upstream collections
//! keep their own page cursors and may shift under server-side insertions.
//!
//! Architectural decisions:
//! - An item becomes visible only once its prefix is proven stable against
//!   further page fetches
//! - One reconciliation pass at a time; a request during a pass is ignored
//! - A failed fetch aborts the pass and never retracts proven items
//! - All pages are read and written through an injected cache handle
//! - The combined total is frozen on first sight, never recomputed

mod reconciler;
mod view;

pub use reconciler::TimelineReconciler;
pub use view::TimelineView;
