use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RecordStore, StoreError};

/// In-process store with the same conditional semantics as Redis.
/// Conditional writes run under the write lock, so they are atomic.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
    ops: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Number of store calls served so far.
    pub fn op_count(&self) -> usize { self.ops.load(Ordering::SeqCst) }

    pub async fn len(&self) -> usize { self.inner.read().await.len() }

    pub async fn is_empty(&self) -> bool { self.inner.read().await.is_empty() }

    /// Raw value lookup that does not count as a store call.
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.inner.read().await.get(key).cloned()
    }

    /// Seed a raw value without counting it as a store call.
    pub async fn seed(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.write().await.insert(key.into(), value.into());
    }

    fn touch(&self) { self.ops.fetch_add(1, Ordering::SeqCst); }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.touch();
        Ok(self.inner.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.touch();
        self.inner.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        self.touch();
        let mut map = self.inner.write().await;
        if map.contains_key(key) {
            return Ok(false);
        }
        map.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    async fn set_if_present(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        self.touch();
        let mut map = self.inner.write().await;
        match map.get_mut(key) {
            Some(slot) => {
                *slot = value.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.touch();
        Ok(self.inner.write().await.remove(key).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
