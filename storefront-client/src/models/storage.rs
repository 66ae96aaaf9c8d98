use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait SessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Redis-backed store. Keys are namespaced by session id and expire after
/// `ttl_secs` so abandoned sessions clean themselves up.
pub struct RedisSessionStore {
    client: redis::Client,
    session_id: String,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn new(redis_url: &str, session_id: &str, ttl_secs: u64) -> Result<Self, StorageError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client,
            session_id: session_id.to_string(),
            ttl_secs,
        })
    }

    pub async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, StorageError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    fn scoped_key(&self, key: &str) -> String {
        format!("session:{}:{}", self.session_id, key)
    }

    pub async fn test_connection(&self) -> Result<(), StorageError> {
        let mut conn = self.get_connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = redis::cmd("GET")
            .arg(self.scoped_key(key))
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut conn = self.get_connection().await?;
        redis::cmd("SET")
            .arg(self.scoped_key(key))
            .arg(value)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut conn = self.get_connection().await?;
        redis::cmd("DEL")
            .arg(self.scoped_key(key))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}
