use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisResult, Value};
use tracing::{debug, warn};

use super::{RecordStore, StoreError};

/// Redis-backed store. Holds one multiplexed, auto-reconnecting connection
/// that is cloned per command; every command is bounded by `command_timeout`.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    command_timeout: Duration,
}

impl RedisStore {
    /// Open a connection manager for `url` (`redis://host:port/db`).
    pub async fn connect(url: &str, command_timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::open(url).map_err(|e| StoreError::Backend(e.to_string()))?;
        let conn = tokio::time::timeout(command_timeout, client.get_connection_manager())
            .await
            .map_err(|_| StoreError::Timeout(command_timeout))?
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self { conn, command_timeout })
    }

    async fn bounded<T, F>(&self, op: &'static str, key: &str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.command_timeout, fut).await {
            Ok(Ok(v)) => {
                debug!(op, key, "redis command ok");
                Ok(v)
            }
            Ok(Err(e)) => {
                warn!(op, key, error = %e, "redis command failed");
                Err(StoreError::Backend(e.to_string()))
            }
            Err(_) => {
                warn!(op, key, timeout_ms = self.command_timeout.as_millis() as u64, "redis command timed out");
                Err(StoreError::Timeout(self.command_timeout))
            }
        }
    }
}

#[async_trait]
impl RecordStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut con = self.conn.clone();
        self.bounded("GET", key, async move { con.get(key).await }).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut con = self.conn.clone();
        self.bounded("SET", key, async move { con.set(key, value).await }).await
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        let mut con = self.conn.clone();
        self.bounded("SETNX", key, async move { con.set_nx(key, value).await }).await
    }

    async fn set_if_present(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        let mut con = self.conn.clone();
        // SET .. XX replies OK when written and nil when the key was absent
        let reply: Value = self
            .bounded("SET XX", key, async move {
                redis::cmd("SET").arg(key).arg(value).arg("XX").query_async(&mut con).await
            })
            .await?;
        Ok(!matches!(reply, Value::Nil))
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut con = self.conn.clone();
        let removed: i64 = self.bounded("DEL", key, async move { con.del(key).await }).await?;
        Ok(removed > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut con = self.conn.clone();
        let _: String = self
            .bounded("PING", "", async move { redis::cmd("PING").query_async(&mut con).await })
            .await?;
        Ok(())
    }
}
