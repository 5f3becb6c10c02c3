//! Key/value persistence used by sessions and approval status
//!
//! The pipeline only sees the [`KvStore`] trait. [`RedisStore`] is the
//! production backend; [`MemoryStore`] backs tests and local runs without
//! redis.

mod memory;
mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use async_trait::async_trait;

use crate::core::error::AppResult;

/// Minimal store contract: plain string values plus hash fields
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Reads a plain value
    async fn read(&self, key: &str) -> AppResult<Option<String>>;

    /// Writes a plain value, replacing any previous one
    async fn write(&self, key: &str, value: &str) -> AppResult<()>;

    /// Reads one field of a hash
    async fn hget(&self, key: &str, field: &str) -> AppResult<Option<String>>;

    /// Writes one field of a hash
    async fn hset(&self, key: &str, field: &str, value: &str) -> AppResult<()>;
}
