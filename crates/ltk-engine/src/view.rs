use ltk_api::FetchError;
use ltk_schemas::TimelineItem;

/// Point-in-time view of the merged timeline, as exposed to the consumer.
#[derive(Debug, Clone)]
pub struct TimelineView {
    /// The proven-stable slice, at most as long as the requested prefix.
    pub items: Vec<TimelineItem>,
    /// Combined item count as first declared by the collections, or the
    /// deduplicated count once both collections are exhausted. `None` until a
    /// first page pair has been seen.
    pub total_count: Option<u64>,
    /// `true` while the timeline can still be extended.
    pub has_more: bool,
    /// `true` while a reconciliation pass is in flight.
    pub is_loading: bool,
    /// Error that aborted the most recent pass, cleared by the next
    /// successful one.
    pub error: Option<FetchError>,
}
