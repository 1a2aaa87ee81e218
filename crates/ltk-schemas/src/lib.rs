use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the two upstream collections merged into the activity timeline.
///
/// Ordering (`Order < Enrollment`) is part of the deterministic tie-break
/// for items sharing the same `created_on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Order,
    Enrollment,
}

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Order => "order",
            CollectionKind::Enrollment => "enrollment",
        }
    }
}

/// Order as returned by the commerce API.
///
/// Only `id` and `created_on` are read by the merge logic; everything else is
/// carried verbatim for the consumer. Monetary amounts stay decimal strings so
/// no float rounding is introduced at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub created_on: DateTime<Utc>,
    pub state: String,
    #[serde(default)]
    pub product_title: Option<String>,
    #[serde(default)]
    pub total: Option<String>,
    #[serde(default)]
    pub total_currency: Option<String>,
}

/// Enrollment as returned by the LMS-backed enrollments endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub id: String,
    pub created_on: DateTime<Utc>,
    pub state: String,
    #[serde(default)]
    pub course_run_title: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub was_created_by_order: bool,
}

/// Identity of a timeline item: unique within its kind only.
///
/// The two collections have independent id spaces; an order and an enrollment
/// sharing the same raw id are distinct items and are never deduplicated
/// against each other.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemIdentity {
    pub kind: CollectionKind,
    pub id: String,
}

/// A single entry of the combined activity timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineItem {
    Order(OrderRecord),
    Enrollment(EnrollmentRecord),
}

impl TimelineItem {
    pub fn kind(&self) -> CollectionKind {
        match self {
            TimelineItem::Order(_) => CollectionKind::Order,
            TimelineItem::Enrollment(_) => CollectionKind::Enrollment,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            TimelineItem::Order(o) => &o.id,
            TimelineItem::Enrollment(e) => &e.id,
        }
    }

    pub fn created_on(&self) -> DateTime<Utc> {
        match self {
            TimelineItem::Order(o) => o.created_on,
            TimelineItem::Enrollment(e) => e.created_on,
        }
    }

    pub fn identity(&self) -> ItemIdentity {
        ItemIdentity {
            kind: self.kind(),
            id: self.id().to_string(),
        }
    }
}

/// Page envelope shared by both paginated endpoints.
///
/// `next == None` is the authoritative "last page" signal; `count` is the
/// collection total as declared by the server at response time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageEnvelope<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> PageEnvelope<T> {
    pub fn is_last_page(&self) -> bool {
        self.next.is_none()
    }
}
