//! Source boundary for paginated sub-collections.
//!
//! This module defines **only** the page shape, the source trait, and the
//! filter-signature helper. Concrete HTTP clients live in `client.rs`; cache
//! and merge logic do not belong here.

use std::collections::BTreeMap;

use async_trait::async_trait;
use ltk_schemas::{CollectionKind, TimelineItem};

use crate::FetchError;

/// One fetched page, already lifted into timeline items.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePage {
    pub items: Vec<TimelineItem>,
    /// Collection total as declared by the server in this response.
    pub count: u64,
    /// `true` when the server advertised a further page.
    pub has_next: bool,
}

/// One independently paginated upstream collection.
///
/// Implementations must be object-safe so callers can hold an
/// `Arc<dyn CollectionSource>`, and `Send + Sync` so fetches can be issued
/// from spawned reconciliation passes.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    fn kind(&self) -> CollectionKind;

    /// Stable serialization of this source's filter parameters; used as a
    /// cache-key component. Two sources with the same kind and signature are
    /// interchangeable views of the same server-side collection.
    fn filter_signature(&self) -> String;

    /// Fetch page `page` (1-based) with `page_size` items per page.
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<SourcePage, FetchError>;
}

/// Deterministic signature of a filter set: JSON of a sorted map.
pub fn filter_signature(params: &BTreeMap<String, String>) -> String {
    let map: serde_json::Map<String, serde_json::Value> = params
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect();
    serde_json::Value::Object(map).to_string()
}
