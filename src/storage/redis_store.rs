use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::RwLock;

use super::KvStore;
use crate::core::error::{AppError, AppResult};

/// Redis-backed store
///
/// Owns one multiplexed connection; clones of it are cheap and safe to use
/// concurrently. The entry point calls [`RedisStore::connect`] at startup and
/// [`RedisStore::disconnect`] on shutdown.
pub struct RedisStore {
    conn: RwLock<Option<MultiplexedConnection>>,
}

impl RedisStore {
    /// Opens a connection to `url` (e.g. `redis://127.0.0.1:6379`)
    pub async fn connect(url: &str) -> AppResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        log::info!("Redis connected successfully");
        Ok(Self {
            conn: RwLock::new(Some(conn)),
        })
    }

    /// Drops the connection; later calls fail with a transport error
    pub async fn disconnect(&self) {
        if self.conn.write().await.take().is_some() {
            log::info!("Redis disconnected");
        }
    }

    async fn connection(&self) -> AppResult<MultiplexedConnection> {
        self.conn
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::Transport("redis connection is closed".to_string()))
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn read(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn write(&self, key: &str, value: &str) -> AppResult<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn hget(&self, key: &str, field: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.hget(key, field).await?;
        Ok(value)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> AppResult<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.hset(key, field, value).await?;
        Ok(())
    }
}
