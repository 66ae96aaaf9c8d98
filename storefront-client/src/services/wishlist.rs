use crate::models::account::{AccountError, AuthSession};
use crate::models::wishlist::WishlistBackend;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info};

pub type Backend = Arc<dyn WishlistBackend + Send + Sync>;

pub struct WishlistService {
    backend: Backend,
    saved: Mutex<HashSet<String>>,
}

impl WishlistService {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            saved: Mutex::new(HashSet::new()),
        }
    }

    fn saved(&self) -> MutexGuard<'_, HashSet<String>> {
        self.saved.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn contains(&self, book_id: &str) -> bool {
        self.saved().contains(book_id)
    }

    pub fn saved_keys(&self) -> HashSet<String> {
        self.saved().clone()
    }

    pub fn forget(&self) {
        self.saved().clear();
    }

    pub async fn refresh(&self, session: &AuthSession) -> Result<usize, AccountError> {
        let entries = self.backend.list(session).await.map_err(|e| {
            error!("Failed to load wishlist: {}", e);
            e
        })?;

        let keys: HashSet<String> = entries.into_iter().map(|entry| entry.book_id).collect();
        let count = keys.len();
        *self.saved() = keys;
        Ok(count)
    }

    /// Adds or removes `book_id`; returns whether it is wishlisted afterwards.
    pub async fn toggle(&self, session: &AuthSession, book_id: &str) -> Result<bool, AccountError> {
        if self.contains(book_id) {
            if let Err(e) = self.backend.remove(session, book_id).await {
                error!("Failed to remove {} from wishlist: {}", book_id, e);
                return Err(e);
            }
            self.saved().remove(book_id);
            info!("Removed {} from wishlist", book_id);
            Ok(false)
        } else {
            if let Err(e) = self.backend.add(session, book_id).await {
                error!("Failed to add {} to wishlist: {}", book_id, e);
                return Err(e);
            }
            self.saved().insert(book_id.to_string());
            info!("Added {} to wishlist", book_id);
            Ok(true)
        }
    }
}
