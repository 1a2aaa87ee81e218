//! ltk-cache
//!
//! Page cache and per-collection EOF map for the timeline data layer.
//!
//! The cache is always an explicit handle passed into consumers, scoped to
//! one authenticated session; there is no ambient singleton. Pages are keyed
//! by collection kind + filter signature + page index, so the same endpoint
//! queried under different filters never shares entries.

use std::collections::HashMap;
use std::sync::RwLock;

use ltk_schemas::{CollectionKind, TimelineItem};

/// Key of one cached page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: CollectionKind,
    pub filter_signature: String,
    pub page: u32,
}

/// One page as fetched from a sub-collection, with its pagination metadata.
///
/// `count` is the collection total declared by the server when this page was
/// fetched; `is_last` records the absence of a `next` link.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPage {
    pub items: Vec<TimelineItem>,
    pub count: u64,
    pub is_last: bool,
}

/// Storage interface the reconciler reads and writes through.
///
/// Implementations must be `Send + Sync`; the reconciler shares one handle
/// across passes and never mutates the store out of band.
pub trait PageCache: Send + Sync {
    /// Cached page, or `None` when this page was never stored.
    fn get_page(&self, key: &CacheKey) -> Option<CachedPage>;

    fn put_page(&self, key: CacheKey, page: CachedPage);

    /// Last page index known to be final for this collection + filters, if
    /// any page has reported itself last yet.
    fn eof_page(&self, kind: CollectionKind, filter_signature: &str) -> Option<u32>;

    /// Record the final page index. First write wins; a collection does not
    /// grow a new last page within one session's cache.
    fn record_eof(&self, kind: CollectionKind, filter_signature: &str, page: u32);
}

/// In-memory `PageCache` backed by `RwLock`ed maps.
///
/// No eviction: one dashboard session holds at most a few dozen pages.
#[derive(Debug, Default)]
pub struct MemoryPageCache {
    pages: RwLock<HashMap<CacheKey, CachedPage>>,
    eof: RwLock<HashMap<(CollectionKind, String), u32>>,
}

impl MemoryPageCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageCache for MemoryPageCache {
    fn get_page(&self, key: &CacheKey) -> Option<CachedPage> {
        self.pages
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn put_page(&self, key: CacheKey, page: CachedPage) {
        self.pages
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, page);
    }

    fn eof_page(&self, kind: CollectionKind, filter_signature: &str) -> Option<u32> {
        self.eof
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(kind, filter_signature.to_string()))
            .copied()
    }

    fn record_eof(&self, kind: CollectionKind, filter_signature: &str, page: u32) {
        self.eof
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry((kind, filter_signature.to_string()))
            .or_insert(page);
    }
}
