//! Scenario: server-side insertion between passes cannot rewrite history.
//!
//! A new record appearing upstream shifts every page boundary. Pages already
//! fetched are pinned in the session cache, so the proven prefix the user has
//! seen stays exactly as it was while deeper items are still proven against
//! fresh fetches.
//!
//! # Invariants under test
//!
//! 1. Proven prefixes are identical across passes (stability).
//! 2. Integrity only grows across successive requests (monotonic growth).

use std::sync::Arc;

use ltk_cache::MemoryPageCache;
use ltk_engine::TimelineReconciler;
use ltk_schemas::CollectionKind;
use ltk_testkit::{enrollment_item, order_item, ScriptedCollection};

#[tokio::test]
async fn insertion_shifts_pages_but_not_the_proven_prefix() {
    let orders = Arc::new(ScriptedCollection::new(
        CollectionKind::Order,
        vec![
            vec![order_item("o1", 100)],
            vec![order_item("o2", 90)],
            vec![order_item("o3", 10)],
        ],
    ));
    let enrollments = Arc::new(ScriptedCollection::new(
        CollectionKind::Enrollment,
        vec![vec![enrollment_item("e1", 95)], vec![enrollment_item("e2", 80)]],
    ));
    let rec = TimelineReconciler::new(
        orders.clone(),
        enrollments.clone(),
        Arc::new(MemoryPageCache::new()),
        10,
    );

    let first = rec.extend_to(2).await;
    let first_ids: Vec<String> = first.items.iter().map(|i| i.id().to_string()).collect();
    assert_eq!(first_ids, vec!["o1", "e1"]);

    // A brand-new order lands upstream; every order page shifts by one.
    orders.set_pages(vec![
        vec![order_item("o0", 200)],
        vec![order_item("o1", 100)],
        vec![order_item("o2", 90)],
        vec![order_item("o3", 10)],
    ]);

    let second = rec.extend_to(4).await;
    let second_ids: Vec<String> = second.items.iter().map(|i| i.id().to_string()).collect();

    // Monotonic growth, and the old prefix is byte-for-byte the new one.
    assert_eq!(second_ids.len(), 4);
    assert_eq!(&second_ids[..2], &first_ids[..]);
    assert_eq!(second_ids, vec!["o1", "e1", "o2", "e2"]);
}
