use crate::models::account::{ensure_success, AccountError, AuthSession};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub user_id: Uuid,
    pub book_id: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait WishlistBackend {
    async fn add(&self, session: &AuthSession, book_id: &str) -> Result<(), AccountError>;
    async fn remove(&self, session: &AuthSession, book_id: &str) -> Result<(), AccountError>;
    async fn list(&self, session: &AuthSession) -> Result<Vec<WishlistEntry>, AccountError>;
}

/// Wishlist table reached through the hosted REST API. Row level security on
/// the service side restricts every call to the caller's own rows.
pub struct SupabaseWishlist {
    client: Client,
    rest_url: String,
    anon_key: String,
}

impl SupabaseWishlist {
    pub fn new(client: Client, supabase_url: &str, anon_key: &str) -> Self {
        Self {
            client,
            rest_url: format!("{}/rest/v1/wishlist", supabase_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
        }
    }

    fn request(&self, method: reqwest::Method, session: &AuthSession) -> reqwest::RequestBuilder {
        self.client
            .request(method, &self.rest_url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
    }
}

#[derive(Serialize)]
struct NewWishlistRow<'a> {
    user_id: Uuid,
    book_id: &'a str,
}

#[async_trait]
impl WishlistBackend for SupabaseWishlist {
    async fn add(&self, session: &AuthSession, book_id: &str) -> Result<(), AccountError> {
        let response = self
            .request(reqwest::Method::POST, session)
            .header("Prefer", "return=minimal")
            .json(&NewWishlistRow {
                user_id: session.user.id,
                book_id,
            })
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn remove(&self, session: &AuthSession, book_id: &str) -> Result<(), AccountError> {
        let response = self
            .request(reqwest::Method::DELETE, session)
            .query(&[
                ("user_id", format!("eq.{}", session.user.id)),
                ("book_id", format!("eq.{}", book_id)),
            ])
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn list(&self, session: &AuthSession) -> Result<Vec<WishlistEntry>, AccountError> {
        let response = self
            .request(reqwest::Method::GET, session)
            .query(&[
                ("user_id", format!("eq.{}", session.user.id)),
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;

        let body = ensure_success(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

pub struct PostgresWishlist {
    pool: PgPool,
}

impl PostgresWishlist {
    pub async fn new(database_url: &str) -> Result<Self, AccountError> {
        let pool = PgPool::connect(database_url).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS wishlist (
                user_id UUID NOT NULL,
                book_id TEXT NOT NULL,
                created_at TIMESTAMPTZ DEFAULT NOW(),
                PRIMARY KEY (user_id, book_id)
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl WishlistBackend for PostgresWishlist {
    async fn add(&self, session: &AuthSession, book_id: &str) -> Result<(), AccountError> {
        sqlx::query(
            "INSERT INTO wishlist (user_id, book_id) VALUES ($1, $2) ON CONFLICT (user_id, book_id) DO NOTHING",
        )
        .bind(session.user.id)
        .bind(book_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, session: &AuthSession, book_id: &str) -> Result<(), AccountError> {
        sqlx::query("DELETE FROM wishlist WHERE user_id = $1 AND book_id = $2")
            .bind(session.user.id)
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list(&self, session: &AuthSession) -> Result<Vec<WishlistEntry>, AccountError> {
        let rows = sqlx::query(
            "SELECT user_id, book_id, created_at FROM wishlist WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(session.user.id)
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .into_iter()
            .map(|row| WishlistEntry {
                user_id: row.get("user_id"),
                book_id: row.get("book_id"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok(entries)
    }
}
