//! Scenario: a prefix is proven only by an unchanged iteration comparison.
//!
//! # Invariants under test
//!
//! 1. An empty previous prefix never proves anything.
//! 2. A prefix matching the previous iteration position-wise, with both
//!    stacks at least `n` long, yields `PrefixStable`.
//! 3. A deeper page revealing an older item does not disturb an already
//!    matching shorter prefix.
//! 4. A new item landing inside the requested prefix defeats the proof.
//! 5. Prefix proof wins over exhaustion when both hold.

use chrono::{TimeZone, Utc};
use ltk_merge::{evaluate_iteration, MergeDecision, MergedStack};
use ltk_schemas::{EnrollmentRecord, OrderRecord, TimelineItem};

fn order(id: &str, ts: i64) -> TimelineItem {
    TimelineItem::Order(OrderRecord {
        id: id.to_string(),
        created_on: Utc.timestamp_opt(ts, 0).unwrap(),
        state: "validated".to_string(),
        product_title: None,
        total: None,
        total_currency: None,
    })
}

fn enrollment(id: &str, ts: i64) -> TimelineItem {
    TimelineItem::Enrollment(EnrollmentRecord {
        id: id.to_string(),
        created_on: Utc.timestamp_opt(ts, 0).unwrap(),
        state: "set".to_string(),
        course_run_title: None,
        is_active: true,
        was_created_by_order: false,
    })
}

#[test]
fn empty_previous_prefix_never_proves() {
    let mut stack = MergedStack::new();
    stack.absorb(vec![order("o1", 10), enrollment("e1", 9)]);
    stack.sort_descending();

    let decision = evaluate_iteration(&[], &stack, 2, false, true);
    assert_eq!(decision, MergeDecision::NeedMorePages);
}

#[test]
fn unchanged_prefix_is_proven() {
    // Iteration 1: orders page 1 + enrollments page 1.
    let mut stack = MergedStack::new();
    stack.absorb(vec![order("o1", 10), enrollment("e1", 9)]);
    stack.sort_descending();
    let previous = stack.prefix_identities(2);

    // Iteration 2: orders page 2 adds only an older item.
    stack.absorb(vec![order("o2", 1)]);
    stack.sort_descending();

    let decision = evaluate_iteration(&previous, &stack, 2, false, true);
    assert_eq!(decision, MergeDecision::PrefixStable { proven: 2 });
}

#[test]
fn newer_item_inside_prefix_defeats_proof() {
    let mut stack = MergedStack::new();
    stack.absorb(vec![order("o1", 10), enrollment("e1", 9)]);
    stack.sort_descending();
    let previous = stack.prefix_identities(2);

    // A fresher enrollment outranks e1 and shifts the prefix.
    stack.absorb(vec![enrollment("e2", 11)]);
    stack.sort_descending();

    let decision = evaluate_iteration(&previous, &stack, 2, false, true);
    assert_eq!(decision, MergeDecision::NeedMorePages);
}

#[test]
fn short_stack_cannot_prove_longer_prefix() {
    let mut stack = MergedStack::new();
    stack.absorb(vec![order("o1", 10)]);
    stack.sort_descending();
    let previous = stack.prefix_identities(3);

    let decision = evaluate_iteration(&previous, &stack, 3, false, false);
    assert_eq!(decision, MergeDecision::NeedMorePages);
}

#[test]
fn prefix_proof_wins_over_exhaustion() {
    let mut stack = MergedStack::new();
    stack.absorb(vec![order("o1", 10), enrollment("e1", 9), order("o2", 1)]);
    stack.sort_descending();
    let previous = stack.prefix_identities(2);

    let decision = evaluate_iteration(&previous, &stack, 2, true, false);
    assert_eq!(decision, MergeDecision::PrefixStable { proven: 2 });
}
