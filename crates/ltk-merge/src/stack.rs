use std::collections::BTreeSet;

use ltk_schemas::{ItemIdentity, TimelineItem};

/// Candidate stack of merged timeline items.
///
/// Append-only within one reconciliation pass: items are absorbed page by
/// page, deduplicated by `(kind, id)`, then re-sorted. Rebuilding for a new
/// pass means starting from a fresh stack.
#[derive(Debug, Clone, Default)]
pub struct MergedStack {
    items: Vec<TimelineItem>,
    seen: BTreeSet<ItemIdentity>,
}

impl MergedStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    /// First `n` items, or the whole stack when it is shorter.
    pub fn prefix(&self, n: usize) -> &[TimelineItem] {
        &self.items[..n.min(self.items.len())]
    }

    /// Identities of the first `n` items, for iteration-over-iteration
    /// comparison.
    pub fn prefix_identities(&self, n: usize) -> Vec<ItemIdentity> {
        self.prefix(n).iter().map(TimelineItem::identity).collect()
    }

    /// Merge a freshly fetched batch into the stack.
    ///
    /// An item whose `(kind, id)` is already present is dropped; a page
    /// refetched after server-side insertions shifted page boundaries may
    /// legitimately overlap prior pages. Returns the number of items admitted.
    pub fn absorb(&mut self, batch: Vec<TimelineItem>) -> usize {
        let mut admitted = 0;
        for item in batch {
            if self.seen.insert(item.identity()) {
                self.items.push(item);
                admitted += 1;
            }
        }
        admitted
    }

    /// Sort by `created_on` descending, `(kind, id)` ascending on ties.
    ///
    /// The secondary key makes ordering independent of fetch/merge sequence,
    /// so two passes over the same data always agree.
    pub fn sort_descending(&mut self) {
        self.items.sort_by(|a, b| {
            b.created_on()
                .cmp(&a.created_on())
                .then_with(|| a.kind().cmp(&b.kind()))
                .then_with(|| a.id().cmp(b.id()))
        });
    }
}
