use crate::config::{ConfigError, SessionBackendKind, StorefrontConfig, WishlistBackendKind};
use crate::models::account::{AccountError, AuthSession};
use crate::models::details::BookDetails;
use crate::models::storage::{MemorySessionStore, RedisSessionStore, StorageError};
use crate::models::wishlist::{PostgresWishlist, SupabaseWishlist};
use crate::services::auth::SupabaseAuth;
use crate::services::catalog::{CatalogError, OpenLibraryCatalog};
use crate::services::coordinator::RequestCoordinator;
use crate::services::details::load_book_details;
use crate::services::page_cache::{PageStateCache, Store};
use crate::services::wishlist::{Backend, WishlistService};
use crate::utils::cancel::CancelToken;
use crate::views::grid::{page_view, PageView};
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Account error: {0}")]
    Account(#[from] AccountError),
}

pub struct Storefront {
    pub coordinator: Arc<RequestCoordinator>,
    pub catalog: Arc<OpenLibraryCatalog>,
    pub auth: SupabaseAuth,
    pub wishlist: WishlistService,
}

impl Storefront {
    pub fn with_parts(
        catalog: Arc<OpenLibraryCatalog>,
        store: Store,
        auth: SupabaseAuth,
        wishlist: Backend,
    ) -> Self {
        let coordinator = RequestCoordinator::new(catalog.clone(), PageStateCache::new(store));
        Self {
            coordinator: Arc::new(coordinator),
            catalog,
            auth,
            wishlist: WishlistService::new(wishlist),
        }
    }

    pub async fn connect(config: &StorefrontConfig) -> Result<Self, StorefrontError> {
        config.validate()?;
        let client = Client::new();

        let store: Store = match config.session_backend {
            SessionBackendKind::Redis => {
                info!("Using Redis session store at {}", config.redis_url);
                let redis_store = RedisSessionStore::new(
                    &config.redis_url,
                    &config.session_id,
                    config.session_ttl_secs,
                )?;
                if let Err(e) = redis_store.test_connection().await {
                    error!("Failed to connect to Redis session store: {}", e);
                    return Err(e.into());
                }
                Arc::new(redis_store)
            }
            SessionBackendKind::Memory => {
                info!("Using in-memory session store");
                Arc::new(MemorySessionStore::new())
            }
        };

        let wishlist: Backend = match config.wishlist_backend {
            WishlistBackendKind::Postgres => {
                info!("Using PostgreSQL wishlist backend");
                let postgres = PostgresWishlist::new(&config.database_url).await.map_err(|e| {
                    error!("Failed to connect to PostgreSQL: {}", e);
                    e
                })?;
                Arc::new(postgres)
            }
            WishlistBackendKind::Supabase => {
                info!("Using Supabase wishlist backend");
                Arc::new(SupabaseWishlist::new(
                    client.clone(),
                    &config.supabase_url,
                    &config.supabase_anon_key,
                ))
            }
        };

        let catalog = Arc::new(OpenLibraryCatalog::new(
            client.clone(),
            &config.catalog_url,
            &config.covers_url,
        ));
        let auth = SupabaseAuth::new(client, &config.supabase_url, &config.supabase_anon_key);

        info!("Storefront session {} ready", config.session_id);
        Ok(Self::with_parts(catalog, store, auth, wishlist))
    }

    pub fn page_view(&self) -> PageView {
        page_view(&self.coordinator.snapshot(), &self.wishlist.saved_keys())
    }

    pub async fn book_details(&self, key: &str) -> Result<BookDetails, CatalogError> {
        load_book_details(&self.catalog, key, &CancelToken::new()).await
    }

    /// Signs in and loads the user's wishlist. A wishlist failure does not
    /// undo the sign-in.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, StorefrontError> {
        let session = self.auth.sign_in(email, password).await?;
        if let Err(e) = self.wishlist.refresh(&session).await {
            warn!("Signed in without wishlist: {}", e);
        }
        Ok(session)
    }

    pub async fn sign_out(&self) -> Result<(), StorefrontError> {
        self.auth.sign_out().await?;
        self.wishlist.forget();
        Ok(())
    }

    /// Returns whether `book_key` is wishlisted afterwards.
    pub async fn toggle_wishlist(&self, book_key: &str) -> Result<bool, StorefrontError> {
        let session = self.auth.session().ok_or(AccountError::NotSignedIn)?;
        Ok(self.wishlist.toggle(&session, book_key).await?)
    }
}
