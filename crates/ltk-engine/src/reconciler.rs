use std::sync::Arc;

use ltk_api::{CollectionSource, FetchError};
use ltk_cache::{CacheKey, CachedPage, PageCache};
use ltk_merge::{evaluate_iteration, MergeDecision, MergedStack, StablePrefix};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::TimelineView;

/// Mutable reconciliation state, guarded by the reconciler's lock.
struct ReconcilerState {
    /// Merged result of the most recent settled pass.
    stack: MergedStack,
    /// Proven-stable prefix length; never regresses.
    stable: StablePrefix,
    /// Caller's prefix request, monotonically non-decreasing.
    cursor: usize,
    /// Next page to fetch; pages below this are already in the cache.
    next_page: u32,
    total_count: Option<u64>,
    /// Both collections exhausted and the full stack settled.
    exhausted: bool,
    last_error: Option<FetchError>,
    in_flight: bool,
}

impl ReconcilerState {
    fn new() -> Self {
        Self {
            stack: MergedStack::new(),
            stable: StablePrefix::new(),
            cursor: 0,
            next_page: 1,
            total_count: None,
            exhausted: false,
            last_error: None,
            in_flight: false,
        }
    }

    fn needs_pass(&self, n: usize) -> bool {
        n > self.stable.len() && !self.exhausted
    }

    fn view(&self) -> TimelineView {
        let visible = self.cursor.min(self.stable.len());
        let has_more = if self.exhausted {
            false
        } else {
            match self.total_count {
                Some(total) => (self.stable.len() as u64) < total,
                None => true,
            }
        };
        TimelineView {
            items: self.stack.prefix(visible).to_vec(),
            total_count: self.total_count,
            has_more,
            is_loading: self.in_flight,
            error: self.last_error.clone(),
        }
    }
}

/// Reconciler over the two independently paginated timeline collections.
///
/// Cheap to clone (all fields are shared handles); one value per mounted
/// dashboard view. State lives for the lifetime of the value, while fetched
/// pages and EOF knowledge persist in the injected [`PageCache`].
#[derive(Clone)]
pub struct TimelineReconciler {
    orders: Arc<dyn CollectionSource>,
    enrollments: Arc<dyn CollectionSource>,
    cache: Arc<dyn PageCache>,
    page_size: u32,
    state: Arc<RwLock<ReconcilerState>>,
}

impl TimelineReconciler {
    pub fn new(
        orders: Arc<dyn CollectionSource>,
        enrollments: Arc<dyn CollectionSource>,
        cache: Arc<dyn PageCache>,
        page_size: u32,
    ) -> Self {
        Self {
            orders,
            enrollments,
            cache,
            page_size,
            state: Arc::new(RwLock::new(ReconcilerState::new())),
        }
    }

    /// Current view of the timeline. Never blocks on network.
    pub async fn current_view(&self) -> TimelineView {
        self.state.read().await.view()
    }

    /// Ask that the visible slice be extended to at least `n` items.
    ///
    /// Returns immediately with the current view; the extension runs on a
    /// spawned reconciliation pass. A call that arrives while a pass is in
    /// flight is ignored (logged at WARN), not queued.
    pub async fn request_prefix(&self, n: usize) -> TimelineView {
        if self.begin_pass(n).await {
            let this = self.clone();
            tokio::spawn(async move { this.run_pass().await });
        }
        self.current_view().await
    }

    /// Same contract as [`request_prefix`] but awaits the pass inline.
    ///
    /// The entry point for callers that want deterministic completion, e.g.
    /// scenario tests and prefetching code paths.
    pub async fn extend_to(&self, n: usize) -> TimelineView {
        if self.begin_pass(n).await {
            self.run_pass().await;
        }
        self.current_view().await
    }

    /// Take the single-pass slot if `n` requires one. Bumps the cursor for
    /// accepted requests; a request arriving during a pass changes nothing.
    async fn begin_pass(&self, n: usize) -> bool {
        let mut g = self.state.write().await;
        if g.in_flight {
            warn!("reconciliation pass already in flight; request for prefix {n} ignored");
            return false;
        }
        g.cursor = g.cursor.max(n);
        if g.needs_pass(n) {
            g.in_flight = true;
            true
        } else {
            false
        }
    }

    /// One reconciliation pass: rebuild the candidate stack from cached
    /// pages, then fetch page pairs until the requested prefix is proven or
    /// both collections are exhausted.
    async fn run_pass(&self) {
        let (requested, start_page) = {
            let g = self.state.read().await;
            (g.cursor, g.next_page)
        };
        debug!("reconciliation pass started: requested={requested} start_page={start_page}");

        let mut stack = MergedStack::new();
        let mut pass_total: Option<u64> = None;
        for page in 1..start_page {
            match self.load_pair(page).await {
                Ok(pair) => {
                    absorb_pair(&mut stack, &mut pass_total, page, pair);
                }
                Err(err) => return self.fail_pass(err).await,
            }
        }
        stack.sort_descending();

        let mut page = start_page;
        loop {
            let previous = stack.prefix_identities(requested);
            let pair = match self.load_pair(page).await {
                Ok(pair) => pair,
                Err(err) => return self.fail_pass(err).await,
            };

            let orders_done = pair.0.as_ref().map_or(true, |p| p.is_last);
            let enrollments_done = pair.1.as_ref().map_or(true, |p| p.is_last);
            let admitted = absorb_pair(&mut stack, &mut pass_total, page, pair);
            stack.sort_descending();

            let decision = evaluate_iteration(
                &previous,
                &stack,
                requested,
                orders_done && enrollments_done,
                admitted > 0,
            );
            match decision {
                MergeDecision::PrefixStable { proven } => {
                    info!("timeline prefix proven stable at {proven} items");
                    return self
                        .settle(stack, page + 1, pass_total, proven, false)
                        .await;
                }
                MergeDecision::FullyExhausted { total } => {
                    info!("collections exhausted; timeline settled at {total} items");
                    return self.settle(stack, page + 1, pass_total, total, true).await;
                }
                MergeDecision::NeedMorePages => {
                    debug!("prefix unsettled after page {page}; fetching further");
                    page += 1;
                }
            }
        }
    }

    /// Fetch page `page` of both collections concurrently, via the cache.
    async fn load_pair(
        &self,
        page: u32,
    ) -> Result<(Option<CachedPage>, Option<CachedPage>), FetchError> {
        let (orders, enrollments) = tokio::join!(
            load_collection_page(
                self.orders.as_ref(),
                self.cache.as_ref(),
                page,
                self.page_size
            ),
            load_collection_page(
                self.enrollments.as_ref(),
                self.cache.as_ref(),
                page,
                self.page_size
            ),
        );
        Ok((orders?, enrollments?))
    }

    async fn settle(
        &self,
        stack: MergedStack,
        next_page: u32,
        pass_total: Option<u64>,
        proven: usize,
        exhausted: bool,
    ) {
        let mut g = self.state.write().await;
        g.stable.advance(proven);
        if exhausted {
            g.exhausted = true;
            if g.total_count.is_none() {
                g.total_count = Some(stack.len() as u64);
            }
        }
        if g.total_count.is_none() {
            g.total_count = pass_total;
        }
        g.stack = stack;
        g.next_page = g.next_page.max(next_page);
        g.last_error = None;
        g.in_flight = false;
    }

    /// Abort the pass: surface the error, release the slot, touch nothing
    /// else. Proven items and the page cursor survive for the retry.
    async fn fail_pass(&self, err: FetchError) {
        error!("page fetch failed; reconciliation pass aborted: {err}");
        let mut g = self.state.write().await;
        g.last_error = Some(err);
        g.in_flight = false;
    }
}

/// Absorb a loaded page pair into the candidate stack.
///
/// Fixes the pass-local combined total from the page-1 declared counts, the
/// only place the servers' totals are ever read.
fn absorb_pair(
    stack: &mut MergedStack,
    pass_total: &mut Option<u64>,
    page: u32,
    pair: (Option<CachedPage>, Option<CachedPage>),
) -> usize {
    let (orders, enrollments) = pair;
    if page == 1 && pass_total.is_none() {
        if let (Some(o), Some(e)) = (&orders, &enrollments) {
            *pass_total = Some(o.count + e.count);
        }
    }
    let mut admitted = 0;
    if let Some(p) = orders {
        admitted += stack.absorb(p.items);
    }
    if let Some(p) = enrollments {
        admitted += stack.absorb(p.items);
    }
    admitted
}

/// Load one collection page, serving from the cache and writing through on a
/// miss. Returns `None` when `page` lies beyond the collection's recorded
/// EOF, so exhausted collections cost nothing on later passes.
async fn load_collection_page(
    source: &dyn CollectionSource,
    cache: &dyn PageCache,
    page: u32,
    page_size: u32,
) -> Result<Option<CachedPage>, FetchError> {
    let kind = source.kind();
    let signature = source.filter_signature();
    if let Some(eof) = cache.eof_page(kind, &signature) {
        if page > eof {
            return Ok(None);
        }
    }

    let key = CacheKey {
        kind,
        filter_signature: signature.clone(),
        page,
    };
    if let Some(hit) = cache.get_page(&key) {
        return Ok(Some(hit));
    }

    let fetched = source.fetch_page(page, page_size).await?;
    let cached = CachedPage {
        items: fetched.items,
        count: fetched.count,
        is_last: !fetched.has_next,
    };
    cache.put_page(key, cached.clone());
    if cached.is_last {
        debug!("{} collection exhausted at page {page}", kind.as_str());
        cache.record_eof(kind, &signature, page);
    }
    Ok(Some(cached))
}
