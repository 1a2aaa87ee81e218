use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use ltk_api::{CollectionSource, FetchError, SourcePage};
use ltk_schemas::{CollectionKind, TimelineItem};
use tokio::sync::watch;

/// Scripted in-process collection for reconciler scenarios.
///
/// Pages are 1-based. The script can be swapped between passes to simulate
/// server-side insertions shifting page boundaries, pages can fail once to
/// simulate transient network errors, and fetches can be held at a gate so a
/// test can observe an in-flight pass. Every `fetch_page` call is counted,
/// cache hits are not.
pub struct ScriptedCollection {
    kind: CollectionKind,
    signature: String,
    pages: Mutex<Vec<Vec<TimelineItem>>>,
    declared_count: Mutex<Option<u64>>,
    fail_pages: Mutex<BTreeSet<u32>>,
    gate: Mutex<Option<watch::Receiver<bool>>>,
    fetch_calls: AtomicU32,
}

impl ScriptedCollection {
    pub fn new(kind: CollectionKind, pages: Vec<Vec<TimelineItem>>) -> Self {
        Self {
            kind,
            signature: "{}".to_string(),
            pages: Mutex::new(pages),
            declared_count: Mutex::new(None),
            fail_pages: Mutex::new(BTreeSet::new()),
            gate: Mutex::new(None),
            fetch_calls: AtomicU32::new(0),
        }
    }

    /// Replace the page script, simulating server-side growth/shift.
    pub fn set_pages(&self, pages: Vec<Vec<TimelineItem>>) {
        *lock(&self.pages) = pages;
    }

    /// Override the `count` the collection declares on every response.
    /// Without an override, the declared count is the scripted item total.
    pub fn declare_count(&self, count: u64) {
        *lock(&self.declared_count) = Some(count);
    }

    /// Make the next fetch of `page` fail with a transport error. One-shot:
    /// the retry succeeds.
    pub fn fail_once_on_page(&self, page: u32) {
        lock(&self.fail_pages).insert(page);
    }

    /// Hold every subsequent fetch at a gate until the returned sender is
    /// fed `true`.
    pub fn hold_fetches(&self) -> watch::Sender<bool> {
        let (tx, rx) = watch::channel(false);
        *lock(&self.gate) = Some(rx);
        tx
    }

    /// Number of `fetch_page` calls that reached this collection.
    pub fn fetch_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CollectionSource for ScriptedCollection {
    fn kind(&self) -> CollectionKind {
        self.kind
    }

    fn filter_signature(&self) -> String {
        self.signature.clone()
    }

    async fn fetch_page(&self, page: u32, _page_size: u32) -> Result<SourcePage, FetchError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        let gate = lock(&self.gate).clone();
        if let Some(mut rx) = gate {
            let _ = rx.wait_for(|open| *open).await;
        }

        if lock(&self.fail_pages).remove(&page) {
            return Err(FetchError::Transport(format!(
                "injected failure on page {page}"
            )));
        }

        let pages = lock(&self.pages).clone();
        let items = pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default();
        let scripted_total = pages.iter().map(Vec::len).sum::<usize>() as u64;
        let count = (*lock(&self.declared_count)).unwrap_or(scripted_total);
        Ok(SourcePage {
            items,
            count,
            has_next: (page as usize) < pages.len(),
        })
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
