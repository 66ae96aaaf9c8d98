use crate::models::book::Book;
use crate::models::page::{CachedViewState, ResultPage};
use crate::models::query::{FilterSelection, Query, SortOrder};
use crate::services::catalog::{CatalogError, CatalogSource, PAGE_SIZE};
use crate::services::page_cache::PageStateCache;
use crate::utils::cancel::CancelToken;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

pub type Catalog = Arc<dyn CatalogSource + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    Empty,
    Loading,
    Displayed,
}

#[derive(Debug)]
pub enum LoadOutcome {
    Applied { received: usize, has_more: bool },
    Restored { books: usize },
    /// A newer request was issued while this one was in flight.
    Stale,
    Cancelled,
    Failed(CatalogError),
    Skipped,
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, LoadOutcome::Applied { .. } | LoadOutcome::Restored { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub query: Query,
    pub books: Vec<Book>,
    pub total: u64,
    pub page: u32,
    pub has_more: bool,
    pub phase: ViewPhase,
    pub failed: bool,
}

/// Mutable state of one browsing session. Only touched while the
/// coordinator's lock is held, and never across an `.await`.
#[derive(Debug)]
struct SessionContext {
    query: Query,
    books: Vec<Book>,
    total: u64,
    page: u32,
    has_more: bool,
    phase: ViewPhase,
    failed: bool,
    loading_more: bool,
    request_seq: u64,
    in_flight: Option<CancelToken>,
    restore_attempted: bool,
}

impl SessionContext {
    fn new() -> Self {
        Self {
            query: Query::popular(),
            books: Vec::new(),
            total: 0,
            page: 1,
            has_more: false,
            phase: ViewPhase::Empty,
            failed: false,
            loading_more: false,
            request_seq: 0,
            in_flight: None,
            restore_attempted: false,
        }
    }

    fn begin_request(&mut self, append: bool) -> (u64, CancelToken) {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }

        self.request_seq += 1;
        let token = CancelToken::new();
        self.in_flight = Some(token.clone());

        if !append {
            self.phase = ViewPhase::Loading;
            self.failed = false;
        }

        (self.request_seq, token)
    }

    fn apply(&mut self, result: ResultPage, append: bool) -> usize {
        let received = result.books.len();

        if append {
            self.books.extend(result.books);
        } else {
            self.books = result.books;
        }

        self.has_more = !result.query.is_popular() && received >= PAGE_SIZE;
        self.query = result.query;
        self.total = result.total;
        self.page = result.page;
        self.phase = ViewPhase::Displayed;
        self.failed = false;

        received
    }

    fn fail(&mut self, append: bool) {
        if append {
            self.has_more = false;
            return;
        }

        self.books.clear();
        self.total = 0;
        self.page = 1;
        self.has_more = false;
        self.query.term = None;
        self.phase = ViewPhase::Empty;
        self.failed = true;
    }

    fn settle(&mut self) {
        self.phase = if self.books.is_empty() {
            ViewPhase::Empty
        } else {
            ViewPhase::Displayed
        };
    }

    fn restore(&mut self, state: CachedViewState) {
        self.query = state.query;
        self.books = state.books;
        self.total = state.total;
        self.page = state.page;
        self.has_more = state.has_more;
        self.phase = ViewPhase::Displayed;
        self.failed = false;
    }

    fn cache_state(&self) -> CachedViewState {
        CachedViewState {
            query: self.query.clone(),
            books: self.books.clone(),
            total: self.total,
            page: self.page,
            has_more: self.has_more,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            query: self.query.clone(),
            books: self.books.clone(),
            total: self.total,
            page: self.page,
            has_more: self.has_more,
            phase: self.phase,
            failed: self.failed,
        }
    }
}

pub struct RequestCoordinator {
    catalog: Catalog,
    cache: PageStateCache,
    context: Mutex<SessionContext>,
}

impl RequestCoordinator {
    pub fn new(catalog: Catalog, cache: PageStateCache) -> Self {
        Self {
            catalog,
            cache,
            context: Mutex::new(SessionContext::new()),
        }
    }

    fn context(&self) -> MutexGuard<'_, SessionContext> {
        self.context
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.context().snapshot()
    }

    pub async fn load(&self, query: Query, page: u32, append: bool) -> LoadOutcome {
        let (seq, token) = self.context().begin_request(append);
        self.fetch(query, page, append, seq, token).await
    }

    /// Claims a fresh request for a new query, clears the cached grid and
    /// loads page 1. The claim happens before the first `.await`, so a
    /// response to the old query can no longer be applied.
    async fn start_query(&self, query: Query) -> LoadOutcome {
        let (seq, token) = self.context().begin_request(false);
        self.cache.clear().await;
        self.fetch(query, 1, false, seq, token).await
    }

    async fn fetch(
        &self,
        query: Query,
        page: u32,
        append: bool,
        seq: u64,
        token: CancelToken,
    ) -> LoadOutcome {
        if self.context().request_seq != seq {
            return LoadOutcome::Stale;
        }
        debug!("Request {} issued: term={:?} page={} append={}", seq, query.term, page, append);

        let result = self.catalog.search(&query, page, &token).await;

        let (outcome, state) = {
            let mut ctx = self.context();
            if ctx.request_seq != seq {
                debug!("Request {} superseded by {}, discarding response", seq, ctx.request_seq);
                return LoadOutcome::Stale;
            }
            ctx.in_flight = None;

            match result {
                Ok(result_page) => {
                    let received = ctx.apply(result_page, append);
                    let outcome = LoadOutcome::Applied {
                        received,
                        has_more: ctx.has_more,
                    };
                    (outcome, ctx.cache_state())
                }
                Err(e) if e.is_cancelled() => {
                    debug!("Request {} cancelled", seq);
                    ctx.settle();
                    return LoadOutcome::Cancelled;
                }
                Err(e) => {
                    error!("Error loading books: {}", e);
                    ctx.fail(append);
                    return LoadOutcome::Failed(e);
                }
            }
        };

        let is_current = || self.context().request_seq == seq;
        if let Err(e) = self.cache.save_current(&state, is_current).await {
            warn!("Error saving page state: {}", e);
        }

        outcome
    }

    pub async fn enter_page(&self, search_param: Option<&str>) -> LoadOutcome {
        if let Some(term) = search_param.map(str::trim).filter(|t| !t.is_empty()) {
            return self.load(Query::search(term), 1, false).await;
        }

        let (first_entry, seq) = {
            let mut ctx = self.context();
            let first_entry = !ctx.restore_attempted;
            ctx.restore_attempted = true;
            (first_entry, ctx.request_seq)
        };

        if first_entry {
            if let Some(state) = self.cache.restore().await {
                let mut ctx = self.context();
                if ctx.request_seq != seq {
                    return LoadOutcome::Stale;
                }
                let books = state.books.len();
                ctx.restore(state);
                return LoadOutcome::Restored { books };
            }
            info!("No cached page state, loading popular books");
        }

        self.load(Query::popular(), 1, false).await
    }

    /// A blank term goes back to popular books.
    pub async fn search(&self, term: &str) -> LoadOutcome {
        let term = term.trim();
        if term.is_empty() {
            return self.load(Query::popular(), 1, false).await;
        }

        self.start_query(Query::search(term)).await
    }

    pub async fn apply_filter(&self, selection: FilterSelection) -> LoadOutcome {
        let mut filters = self.context().query.filters.clone();
        selection.apply_to(&mut filters);

        let query = Query {
            term: Some(selection.label()),
            filters,
        };
        info!("Filter applied: {:?}", selection);
        self.start_query(query).await
    }

    pub async fn set_sort(&self, sort: SortOrder) -> LoadOutcome {
        let mut query = self.context().query.clone();
        query.filters.sort = sort;

        info!("Sort applied: {:?}", sort);
        self.start_query(query).await
    }

    pub async fn load_more(&self) -> LoadOutcome {
        let (query, next_page) = {
            let mut ctx = self.context();
            if ctx.loading_more || !ctx.has_more || ctx.phase != ViewPhase::Displayed {
                return LoadOutcome::Skipped;
            }
            if ctx.query.is_popular() {
                ctx.has_more = false;
                return LoadOutcome::Skipped;
            }
            ctx.loading_more = true;
            (ctx.query.clone(), ctx.page + 1)
        };

        let outcome = self.load(query, next_page, true).await;
        self.context().loading_more = false;
        outcome
    }

    pub fn cancel_in_flight(&self) {
        let mut ctx = self.context();
        if let Some(token) = ctx.in_flight.take() {
            token.cancel();
            ctx.request_seq += 1;
            ctx.settle();
        }
    }
}
