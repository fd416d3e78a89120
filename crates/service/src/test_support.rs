#![cfg(test)]
use std::sync::Arc;

use async_trait::async_trait;

use crate::directory::{DirectoryPolicy, DirectoryService};
use crate::storage::{MemoryStore, RecordStore, StoreError};

/// A directory over a fresh in-memory store; the returned store handle shares
/// state with the one inside the service.
pub fn memory_directory(policy: DirectoryPolicy) -> (MemoryStore, DirectoryService<MemoryStore>) {
    let store = MemoryStore::new();
    let svc = DirectoryService::new(Arc::new(store.clone()), policy);
    (store, svc)
}

/// Store whose every call fails like a dropped connection.
pub struct FailingStore;

fn refused() -> StoreError { StoreError::Backend("connection refused".into()) }

#[async_trait]
impl RecordStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> { Err(refused()) }
    async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> { Err(refused()) }
    async fn set_if_absent(&self, _key: &str, _value: &str) -> Result<bool, StoreError> { Err(refused()) }
    async fn set_if_present(&self, _key: &str, _value: &str) -> Result<bool, StoreError> { Err(refused()) }
    async fn delete(&self, _key: &str) -> Result<bool, StoreError> { Err(refused()) }
    async fn ping(&self) -> Result<(), StoreError> { Err(refused()) }
}
