use crate::models::page::CachedViewState;
use crate::models::storage::{SessionStore, StorageError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const PAGE_STATE_KEY: &str = "rereadz:page_state";

pub type Store = Arc<dyn SessionStore + Send + Sync>;

#[derive(Clone)]
pub struct PageStateCache {
    store: Store,
    // Orders writes against clears.
    gate: Arc<Mutex<()>>,
}

impl PageStateCache {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            gate: Arc::new(Mutex::new(())),
        }
    }

    pub async fn save(&self, state: &CachedViewState) -> Result<(), StorageError> {
        self.save_current(state, || true).await.map(|_| ())
    }

    /// Writes `state` only if `is_current` still holds once no clear is in
    /// progress. Returns whether the snapshot was written.
    pub async fn save_current<F>(
        &self,
        state: &CachedViewState,
        is_current: F,
    ) -> Result<bool, StorageError>
    where
        F: FnOnce() -> bool + Send,
    {
        let value = serde_json::to_string(state)?;

        let _gate = self.gate.lock().await;
        if !is_current() {
            debug!("Page state superseded, not caching");
            return Ok(false);
        }
        self.store.set(PAGE_STATE_KEY, &value).await?;

        debug!(
            "Page state cached: term={:?} books={} total={} page={} has_more={}",
            state.query.term,
            state.books.len(),
            state.total,
            state.page,
            state.has_more
        );
        Ok(true)
    }

    /// Read and decode failures count as a miss; an undecodable entry is
    /// dropped.
    pub async fn restore(&self) -> Option<CachedViewState> {
        let raw = match self.store.get(PAGE_STATE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Error loading cached page state: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<CachedViewState>(&raw) {
            Ok(state) if state.books.is_empty() => {
                debug!("Cached page state has no books, ignoring");
                None
            }
            Ok(state) => {
                info!(
                    "Restoring cached page state: term={:?} books={}",
                    state.query.term,
                    state.books.len()
                );
                Some(state)
            }
            Err(e) => {
                warn!("Discarding unreadable cached page state: {}", e);
                self.clear().await;
                None
            }
        }
    }

    pub async fn clear(&self) {
        let _gate = self.gate.lock().await;
        if let Err(e) = self.store.remove(PAGE_STATE_KEY).await {
            warn!("Error clearing cached page state: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::{Book, Listing};
    use crate::models::query::{Query, SortOrder};
    use crate::models::storage::MemorySessionStore;

    fn book(key: &str) -> Book {
        Book {
            key: key.to_string(),
            title: format!("Title {}", key),
            author: "Author".into(),
            cover_url: None,
            published_year: Some(1999),
            page_count: None,
            categories: vec![],
            rating: None,
            listing: Listing::for_key(key),
        }
    }

    fn state(books: Vec<Book>) -> CachedViewState {
        let mut query = Query::search("sea stories");
        query.filters.sort = SortOrder::Title;
        CachedViewState {
            query,
            books,
            total: 120,
            page: 2,
            has_more: true,
        }
    }

    #[tokio::test]
    async fn save_then_restore_is_identical() {
        let cache = PageStateCache::new(Arc::new(MemorySessionStore::new()));
        let saved = state(vec![book("/works/OL1W"), book("/works/OL2W")]);

        cache.save(&saved).await.unwrap();
        assert_eq!(cache.restore().await, Some(saved));
    }

    #[tokio::test]
    async fn empty_snapshot_is_a_miss() {
        let cache = PageStateCache::new(Arc::new(MemorySessionStore::new()));
        cache.save(&state(vec![])).await.unwrap();
        assert_eq!(cache.restore().await, None);
    }

    #[tokio::test]
    async fn corrupt_entry_is_a_miss_and_dropped() {
        let store = Arc::new(MemorySessionStore::new());
        store.set(PAGE_STATE_KEY, "{not json").await.unwrap();

        let cache = PageStateCache::new(store.clone());
        assert_eq!(cache.restore().await, None);
        assert_eq!(store.get(PAGE_STATE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn superseded_snapshot_is_not_written() {
        let cache = PageStateCache::new(Arc::new(MemorySessionStore::new()));
        let written = cache
            .save_current(&state(vec![book("/works/OL1W")]), || false)
            .await
            .unwrap();

        assert!(!written);
        assert_eq!(cache.restore().await, None);
    }

    #[tokio::test]
    async fn clear_removes_snapshot() {
        let cache = PageStateCache::new(Arc::new(MemorySessionStore::new()));
        cache.save(&state(vec![book("/works/OL1W")])).await.unwrap();

        cache.clear().await;
        assert_eq!(cache.restore().await, None);
    }
}
