//! Record store adapters.
//!
//! Every directory operation goes through [`RecordStore`], a string-keyed,
//! string-valued store with single-key conditional writes. The Redis adapter
//! is the production backend; the in-memory one backs tests.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub mod memory_store;
pub mod redis_store;

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("command timed out after {0:?}")]
    Timeout(Duration),
}

/// Single-key operations against the backing store. Values never expire.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Value at `key`, or `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write only if `key` is absent; `false` means it already existed.
    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError>;

    /// Write only if `key` exists; `false` means it was absent.
    async fn set_if_present(&self, key: &str, value: &str) -> Result<bool, StoreError>;

    /// Remove `key`; `false` means nothing was there.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
