//! Page loader
//!
//! Owns one list session: the [`PaginationState`] shown to the UI, a single
//! cache slot, the in-flight page set, the active request count and a one-slot
//! request queue.
//!
//! All bookkeeping sits behind one `parking_lot::Mutex`. The lock is never held
//! across an `.await`, so each check-then-act step (cache lookup, in-flight
//! check, budget check, registration) is atomic with respect to other loads.
//!
//! Each in-flight page carries a request id and a [`CancellationToken`].
//! Refresh, retry and shutdown cancel every token and drop the registrations,
//! so a cancelled request that finishes later finds itself detached and leaves
//! both state and bookkeeping alone.

use super::fetcher::{page_query, PageFetcher};
use super::types::{LoadOptions, LoadOutcome, PendingRequest};
use crate::config::PagingConfig;
use crate::decode::{extract_items, extract_total_count, map_in_batches, Normalizer};
use crate::error::{Error, Result};
use crate::location::LocationCache;
use crate::pagination::{decide, LoadMode, PaginationState};
use crate::state::{cache_key, merge_entities, CacheRecord, PageCache};
use crate::types::{Coordinates, Filters, DEFAULT_COORDINATES};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// ============================================================================
// Bookkeeping
// ============================================================================

#[derive(Debug)]
struct InFlight {
    id: u64,
    token: CancellationToken,
}

struct LoaderInner<E> {
    state: PaginationState<E>,
    cache: PageCache<E>,
    in_flight: HashMap<u32, InFlight>,
    active_requests: usize,
    queued: Option<PendingRequest>,
    filters: Filters,
    coordinates: Option<Coordinates>,
    next_request_id: u64,
    closed: bool,
}

impl<E> LoaderInner<E> {
    /// Cancel and forget every in-flight request and the queued one
    fn detach_all(&mut self) -> usize {
        let count = self.in_flight.len();
        for (_, request) in self.in_flight.drain() {
            request.token.cancel();
        }
        self.active_requests = 0;
        self.queued = None;
        count
    }
}

/// Registration handed to the task that performs a fetch
struct Ticket {
    id: u64,
    token: CancellationToken,
    key: String,
    filters: Filters,
}

struct Shared<N: Normalizer> {
    fetcher: Arc<dyn PageFetcher>,
    normalizer: N,
    config: PagingConfig,
    fallback: Coordinates,
    location: Option<watch::Receiver<Option<Coordinates>>>,
    inner: Mutex<LoaderInner<N::Output>>,
    state_tx: watch::Sender<PaginationState<N::Output>>,
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`PageLoader`]
pub struct PageLoaderBuilder<N: Normalizer> {
    fetcher: Arc<dyn PageFetcher>,
    normalizer: N,
    config: PagingConfig,
    filters: Filters,
    coordinates: Option<Coordinates>,
    fallback: Coordinates,
    location: Option<watch::Receiver<Option<Coordinates>>>,
}

impl<N: Normalizer> PageLoaderBuilder<N> {
    /// Paging, cache and concurrency settings
    pub fn paging(mut self, config: PagingConfig) -> Self {
        self.config = config;
        self
    }

    /// Initial filter selection
    pub fn filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Fixed coordinates, taking precedence over the location feed
    pub fn coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Coordinates used when nothing else is known
    pub fn fallback(mut self, fallback: Coordinates) -> Self {
        self.fallback = fallback;
        self
    }

    /// Follow a location cache for the last known position
    pub fn location(mut self, location: &LocationCache) -> Self {
        self.location = Some(location.subscribe());
        self
    }

    /// Follow an arbitrary coordinate feed
    pub fn location_feed(mut self, feed: watch::Receiver<Option<Coordinates>>) -> Self {
        self.location = Some(feed);
        self
    }

    /// Build the loader
    pub fn build(self) -> PageLoader<N> {
        let state = PaginationState::new();
        let (state_tx, _) = watch::channel(state.clone());
        let inner = LoaderInner {
            state,
            cache: PageCache::new(self.config.cache_timeout()),
            in_flight: HashMap::new(),
            active_requests: 0,
            queued: None,
            filters: self.filters,
            coordinates: self.coordinates,
            next_request_id: 0,
            closed: false,
        };

        PageLoader {
            shared: Arc::new(Shared {
                fetcher: self.fetcher,
                normalizer: self.normalizer,
                config: self.config,
                fallback: self.fallback,
                location: self.location,
                inner: Mutex::new(inner),
                state_tx,
            }),
        }
    }
}

// ============================================================================
// Page Loader
// ============================================================================

/// Paginated, cached, concurrency-bounded loader for one list session.
///
/// Cloning is cheap and every clone drives the same session.
pub struct PageLoader<N: Normalizer> {
    shared: Arc<Shared<N>>,
}

impl<N: Normalizer> Clone for PageLoader<N> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<N: Normalizer> PageLoader<N> {
    /// Create a loader with default filters and no location feed
    pub fn new(fetcher: Arc<dyn PageFetcher>, normalizer: N, config: PagingConfig) -> Self {
        Self::builder(fetcher, normalizer).paging(config).build()
    }

    /// Start building a loader
    pub fn builder(fetcher: Arc<dyn PageFetcher>, normalizer: N) -> PageLoaderBuilder<N> {
        PageLoaderBuilder {
            fetcher,
            normalizer,
            config: PagingConfig::default(),
            filters: Filters::default(),
            coordinates: None,
            fallback: DEFAULT_COORDINATES,
            location: None,
        }
    }

    // ------------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------------

    /// Snapshot of the current state
    pub fn state(&self) -> PaginationState<N::Output> {
        self.shared.state_tx.borrow().clone()
    }

    /// Follow state changes
    pub fn subscribe(&self) -> watch::Receiver<PaginationState<N::Output>> {
        self.shared.state_tx.subscribe()
    }

    /// Paging settings
    pub fn config(&self) -> &PagingConfig {
        &self.shared.config
    }

    /// Current filter selection
    pub fn filters(&self) -> Filters {
        self.shared.inner.lock().filters.clone()
    }

    /// Number of fetches currently counted against the budget
    pub fn active_requests(&self) -> usize {
        self.shared.inner.lock().active_requests
    }

    /// Pages currently being fetched, ascending
    pub fn in_flight_pages(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self.shared.inner.lock().in_flight.keys().copied().collect();
        pages.sort_unstable();
        pages
    }

    /// The deferred request, if any
    pub fn queued_request(&self) -> Option<PendingRequest> {
        self.shared.inner.lock().queued
    }

    /// Coordinates the next load would use without an override
    pub fn coordinates(&self) -> Coordinates {
        self.resolve_coordinates(None)
    }

    // ------------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------------

    /// Reload from page 1, dropping the cache and cancelling everything in flight
    pub async fn refresh(&self) -> LoadOutcome {
        if !self.reset("refresh") {
            return LoadOutcome::Skipped;
        }
        self.load_page(1, LoadMode::Refresh, LoadOptions::ignore_cache())
            .await
    }

    /// Like [`refresh`](Self::refresh), but shows the full-screen loading state
    /// when there is nothing on screen yet
    pub async fn retry(&self) -> LoadOutcome {
        let mode = if self.shared.inner.lock().state.data.is_empty() {
            LoadMode::Initial
        } else {
            LoadMode::Refresh
        };
        if !self.reset("retry") {
            return LoadOutcome::Skipped;
        }
        self.load_page(1, mode, LoadOptions::ignore_cache()).await
    }

    /// Load the page after the last one loaded.
    ///
    /// Does nothing while any load is showing a spinner or when the feed is
    /// exhausted.
    pub async fn load_more(&self) -> LoadOutcome {
        let next_page = {
            let inner = self.shared.inner.lock();
            let state = &inner.state;
            if inner.closed || state.is_loading || state.is_loading_more || !state.has_more {
                None
            } else {
                state.current_page.checked_add(1)
            }
        };

        match next_page {
            Some(page) => {
                self.load_page(page, LoadMode::LoadMore, LoadOptions::ignore_cache())
                    .await
            }
            None => LoadOutcome::Skipped,
        }
    }

    /// Change the filter selection. A different selection reloads from page 1.
    pub async fn set_filters(&self, filters: Filters) -> LoadOutcome {
        {
            let mut inner = self.shared.inner.lock();
            if inner.filters == filters {
                return LoadOutcome::Skipped;
            }
            inner.filters = filters;
        }
        self.refresh().await
    }

    /// Pin later loads to `coordinates`, or go back to the location feed with
    /// `None`. Does not reload by itself.
    pub fn set_coordinates(&self, coordinates: Option<Coordinates>) {
        self.shared.inner.lock().coordinates = coordinates;
    }

    /// End the session: cancel everything and refuse further loads
    pub fn shutdown(&self) {
        let cancelled = self.update(|inner| {
            inner.closed = true;
            let cancelled = inner.detach_all();
            inner.state.is_loading = false;
            inner.state.is_loading_more = false;
            inner.state.is_refreshing = false;
            cancelled
        });
        info!(cancelled, "Page loader shut down");
    }

    /// Load one page.
    ///
    /// Resolves coordinates, consults the cache, then either fetches, defers
    /// the request to the queue slot, or does nothing if the page is already
    /// being fetched.
    pub async fn load_page(&self, page: u32, mode: LoadMode, options: LoadOptions) -> LoadOutcome {
        let coordinates = self.resolve_coordinates(options.coordinates);

        let ticket = match self.begin(page, mode, options, coordinates) {
            Ok(ticket) => ticket,
            Err(outcome) => return outcome,
        };

        let limit = self.shared.config.page_size_for(page);
        let query = page_query(&coordinates, &ticket.filters, page, limit);
        debug!(page, mode = %mode, limit, %coordinates, "Fetching page");

        let fetched: Result<Value> = tokio::select! {
            biased;
            _ = ticket.token.cancelled() => Err(Error::Cancelled),
            result = self.shared.fetcher.fetch_page(&query) => result,
        };

        let outcome = match fetched {
            Ok(payload) => self.apply(page, mode, &ticket, coordinates, payload).await,
            Err(e) => self.fail(page, mode, &ticket, e),
        };

        self.finish(page, mode, ticket.id);
        outcome
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn resolve_coordinates(&self, requested: Option<Coordinates>) -> Coordinates {
        requested
            .or_else(|| self.shared.inner.lock().coordinates)
            .or_else(|| self.shared.location.as_ref().and_then(|rx| *rx.borrow()))
            .unwrap_or(self.shared.fallback)
    }

    /// Mutate bookkeeping and publish the resulting state
    fn update<R>(&self, f: impl FnOnce(&mut LoaderInner<N::Output>) -> R) -> R {
        let mut inner = self.shared.inner.lock();
        let result = f(&mut inner);
        self.shared.state_tx.send_replace(inner.state.clone());
        result
    }

    /// Cancel everything and reset paging. Returns false once shut down.
    fn reset(&self, reason: &'static str) -> bool {
        let cancelled = self.update(|inner| {
            if inner.closed {
                return None;
            }
            let cancelled = inner.detach_all();
            inner.cache.clear();
            inner.state.current_page = 0;
            inner.state.has_more = true;
            inner.state.is_loading = false;
            inner.state.is_loading_more = false;
            inner.state.is_refreshing = false;
            Some(cancelled)
        });

        match cancelled {
            Some(cancelled) => {
                debug!(reason, cancelled, "Reset list session");
                true
            }
            None => false,
        }
    }

    /// Cache lookup, in-flight check, budget check and registration, atomically
    fn begin(
        &self,
        page: u32,
        mode: LoadMode,
        options: LoadOptions,
        coordinates: Coordinates,
    ) -> std::result::Result<Ticket, LoadOutcome> {
        let max_concurrent = self.shared.config.max_concurrent_requests;
        let mut guard = self.shared.inner.lock();
        let inner = &mut *guard;

        if inner.closed {
            return Err(LoadOutcome::Skipped);
        }

        let key = cache_key(&coordinates, &inner.filters.sorted_tags());

        if !options.ignore_cache && mode != LoadMode::Prefetch {
            let hit = inner.cache.lookup(&key, page).map(|record| {
                (
                    record.data.clone(),
                    record.current_page,
                    record.has_more,
                    record.total_count,
                )
            });
            if let Some((data, current_page, has_more, total_count)) = hit {
                let state = &mut inner.state;
                state.data = data;
                state.current_page = current_page;
                state.has_more = has_more;
                state.total_count = total_count;
                state.is_loading = false;
                state.error = None;
                self.shared.state_tx.send_replace(state.clone());
                debug!(page, key = %key, "Cache hit");
                return Err(LoadOutcome::CacheHit);
            }
        }

        if inner.in_flight.contains_key(&page) {
            debug!(page, mode = %mode, "Page already in flight");
            return Err(LoadOutcome::AlreadyInFlight);
        }

        if inner.active_requests >= max_concurrent {
            if let Some(replaced) = inner.queued {
                debug!(page = replaced.page, mode = %replaced.mode, "Dropping queued request");
            }
            inner.queued = Some(PendingRequest {
                page,
                mode,
                options: LoadOptions {
                    ignore_cache: true,
                    ..options
                },
            });
            debug!(page, mode = %mode, active = inner.active_requests, "Concurrency budget exhausted, queued");
            return Err(LoadOutcome::Queued);
        }

        inner.next_request_id += 1;
        let id = inner.next_request_id;
        let token = CancellationToken::new();
        inner.in_flight.insert(
            page,
            InFlight {
                id,
                token: token.clone(),
            },
        );
        inner.active_requests += 1;

        let state = &mut inner.state;
        state.error = None;
        match mode {
            LoadMode::Initial => state.is_loading = true,
            LoadMode::Refresh => {
                state.current_page = 0;
                state.has_more = true;
                state.is_refreshing = true;
            }
            LoadMode::LoadMore | LoadMode::Prefetch => state.is_loading_more = true,
        }
        self.shared.state_tx.send_replace(state.clone());

        Ok(Ticket {
            id,
            token,
            key,
            filters: inner.filters.clone(),
        })
    }

    /// Merge a fetched payload into state and the cache
    async fn apply(
        &self,
        page: u32,
        mode: LoadMode,
        ticket: &Ticket,
        coordinates: Coordinates,
        payload: Value,
    ) -> LoadOutcome {
        let config = &self.shared.config;
        let expected = config.page_size_for(page);

        let items = extract_items(&payload);
        let received = items.len();
        let entities = map_in_batches(
            &self.shared.normalizer,
            &items,
            config.start_index_for(page),
            config.normalize_batch_size,
        )
        .await;

        let (has_more, evidence) = decide(&payload, received, expected);
        let total_count = extract_total_count(&payload);

        let applied = self.update(|inner| {
            // Checked under the lock: reset cancels while holding it.
            if ticket.token.is_cancelled() {
                return false;
            }

            let replace = page == 1 || mode == LoadMode::Refresh;
            let state = &mut inner.state;
            state.data = merge_entities(&state.data, entities, replace);
            if page >= state.current_page {
                state.current_page = page;
            }
            state.has_more = has_more;
            state.total_count = total_count;
            state.error = None;
            state.is_loading = false;

            inner.cache.store(CacheRecord {
                key: ticket.key.clone(),
                timestamp: Instant::now(),
                data: state.data.clone(),
                current_page: page,
                has_more,
                total_count,
            });
            true
        });

        if !applied {
            debug!(page, mode = %mode, "Discarding response of cancelled request");
            return LoadOutcome::Cancelled;
        }

        info!(page, mode = %mode, received, has_more, ?evidence, "Page loaded");

        let prefetch_pages = config.prefetch_pages;
        let prefetch = page.checked_add(prefetch_pages).filter(|_| prefetch_pages > 0);
        if let Some(next) = prefetch.filter(|_| mode.triggers_prefetch() && has_more) {
            debug!(page = next, "Scheduling prefetch");
            self.spawn_load(
                next,
                LoadMode::Prefetch,
                LoadOptions::ignore_cache().with_coordinates(coordinates),
            );
        }

        LoadOutcome::Loaded { received, has_more }
    }

    /// Record a failed fetch, unless it was cancelled
    fn fail(&self, page: u32, mode: LoadMode, ticket: &Ticket, error: Error) -> LoadOutcome {
        let message = error.to_string();
        let recorded = self.update(|inner| {
            if error.is_cancelled() || ticket.token.is_cancelled() {
                return false;
            }
            inner.state.error = Some(message.clone());
            if mode == LoadMode::Initial {
                inner.state.is_loading = false;
            }
            true
        });

        if recorded {
            warn!(page, mode = %mode, error = %message, "Page load failed");
            LoadOutcome::Failed { message }
        } else {
            debug!(page, mode = %mode, "Request cancelled");
            LoadOutcome::Cancelled
        }
    }

    /// Release the request's registration and reissue the queued request
    fn finish(&self, page: u32, mode: LoadMode, id: u64) {
        let max_concurrent = self.shared.config.max_concurrent_requests;

        let next = self.update(|inner| {
            let registered = inner.in_flight.get(&page).is_some_and(|r| r.id == id);
            if !registered {
                return None;
            }

            inner.in_flight.remove(&page);
            inner.active_requests = inner.active_requests.saturating_sub(1);
            if mode == LoadMode::Refresh {
                inner.state.is_refreshing = false;
            }
            if mode.is_append() {
                inner.state.is_loading_more = false;
            }

            if inner.active_requests >= max_concurrent {
                return None;
            }
            let pending = inner.queued.take()?;
            if pending.mode == LoadMode::LoadMore && !inner.state.has_more {
                debug!(page = pending.page, "Dropping queued load-more, feed exhausted");
                return None;
            }
            Some(pending)
        });

        if let Some(pending) = next {
            debug!(page = pending.page, mode = %pending.mode, "Reissuing queued request");
            self.spawn_load(pending.page, pending.mode, pending.options);
        }
    }

    /// Run a load on its own task
    fn spawn_load(&self, page: u32, mode: LoadMode, options: LoadOptions) {
        let loader = self.clone();
        let task: BoxFuture<'static, LoadOutcome> =
            Box::pin(async move { loader.load_page(page, mode, options).await });
        tokio::spawn(task);
    }
}

impl<N: Normalizer> std::fmt::Debug for PageLoader<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("PageLoader")
            .field("current_page", &inner.state.current_page)
            .field("items", &inner.state.data.len())
            .field("active_requests", &inner.active_requests)
            .field("queued", &inner.queued)
            .field("closed", &inner.closed)
            .finish_non_exhaustive()
    }
}
