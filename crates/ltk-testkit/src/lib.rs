//! ltk-testkit
//!
//! Shared test support for the timeline crates: scripted in-process
//! collections, record builders, fixture loading, and tracing setup for
//! scenario tests. Nothing here talks to a real endpoint.

mod scripted;

pub use scripted::ScriptedCollection;

use std::fs;
use std::sync::Once;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use ltk_schemas::{EnrollmentRecord, OrderRecord, TimelineItem};

/// Install a fmt subscriber once per test binary. Honors `RUST_LOG`.
pub fn init_test_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .with_test_writer()
            .init();
    });
}

/// Epoch seconds to `DateTime<Utc>`, for terse scenario setup.
pub fn ts(epoch_secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(epoch_secs, 0).unwrap()
}

pub fn order_item(id: &str, epoch_secs: i64) -> TimelineItem {
    TimelineItem::Order(OrderRecord {
        id: id.to_string(),
        created_on: ts(epoch_secs),
        state: "validated".to_string(),
        product_title: None,
        total: None,
        total_currency: None,
    })
}

pub fn enrollment_item(id: &str, epoch_secs: i64) -> TimelineItem {
    TimelineItem::Enrollment(EnrollmentRecord {
        id: id.to_string(),
        created_on: ts(epoch_secs),
        state: "set".to_string(),
        course_run_title: None,
        is_active: true,
        was_created_by_order: false,
    })
}

/// Load a JSON array of timeline items from disk.
pub fn load_timeline_fixture_json(path: &str) -> Result<Vec<TimelineItem>> {
    let s = fs::read_to_string(path).with_context(|| format!("read fixture: {path}"))?;
    let items: Vec<TimelineItem> = serde_json::from_str(&s).context("parse fixture json")?;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn fixture_roundtrip_through_disk() {
        let items = vec![order_item("o1", 100), enrollment_item("e1", 90)];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&items).unwrap()).unwrap();

        let loaded = load_timeline_fixture_json(file.path().to_str().unwrap()).unwrap();
        assert_eq!(loaded, items);
    }

    #[test]
    fn missing_fixture_reports_path() {
        let err = load_timeline_fixture_json("/nonexistent/fixture.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/fixture.json"));
    }
}
