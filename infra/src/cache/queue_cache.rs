//! Queue operations for [`RedisStore`]
//!
//! Three FIFO lists: `sync_queue` feeds the hot-path worker, `retry_queue`
//! parks failed deliveries until the administrative recovery trigger, and
//! `audit_buffer` feeds the cold-path archival worker. Items are appended
//! with RPUSH and consumed with LPOP so list order is arrival order.

use async_trait::async_trait;

use sb_core::domain::entities::{AuditEvent, SyncItem};
use sb_core::errors::DomainResult;
use sb_core::stores::{AuditQueueStore, SyncQueueStore};

use super::RedisStore;

pub(crate) const SYNC_QUEUE_KEY: &str = "sync_queue";
pub(crate) const RETRY_QUEUE_KEY: &str = "retry_queue";
pub(crate) const AUDIT_BUFFER_KEY: &str = "audit_buffer";

impl RedisStore {
    async fn push_json<T: serde::Serialize>(&self, key: &str, value: &T) -> DomainResult<()> {
        let payload =
            serde_json::to_string(value).map_err(crate::InfrastructureError::Serialization)?;
        Ok(self.client().rpush(key, &payload).await?)
    }

    async fn pop_json<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> DomainResult<Option<T>> {
        match self.client().lpop(key).await? {
            Some(raw) => {
                let value =
                    serde_json::from_str(&raw).map_err(crate::InfrastructureError::Serialization)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SyncQueueStore for RedisStore {
    async fn push_sync(&self, item: &SyncItem) -> DomainResult<()> {
        self.push_json(SYNC_QUEUE_KEY, item).await
    }

    async fn pop_sync(&self) -> DomainResult<Option<SyncItem>> {
        self.pop_json(SYNC_QUEUE_KEY).await
    }

    async fn push_retry(&self, item: &SyncItem) -> DomainResult<()> {
        self.push_json(RETRY_QUEUE_KEY, item).await
    }

    async fn pop_retry(&self) -> DomainResult<Option<SyncItem>> {
        self.pop_json(RETRY_QUEUE_KEY).await
    }

    async fn retry_len(&self) -> DomainResult<usize> {
        Ok(self.client().llen(RETRY_QUEUE_KEY).await?)
    }
}

#[async_trait]
impl AuditQueueStore for RedisStore {
    async fn push_event(&self, event: &AuditEvent) -> DomainResult<()> {
        self.push_json(AUDIT_BUFFER_KEY, event).await
    }

    async fn oldest_events(&self, limit: usize) -> DomainResult<Vec<AuditEvent>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let raw = self
            .client()
            .lrange(AUDIT_BUFFER_KEY, 0, limit as isize - 1)
            .await?;
        // A malformed buffer entry would wedge the worker forever; decode
        // failures surface as errors rather than silently dropping events.
        raw.iter()
            .map(|entry| {
                serde_json::from_str(entry)
                    .map_err(|e| crate::InfrastructureError::Serialization(e).into())
            })
            .collect()
    }

    async fn remove_oldest(&self, count: usize) -> DomainResult<()> {
        if count == 0 {
            return Ok(());
        }
        Ok(self
            .client()
            .ltrim(AUDIT_BUFFER_KEY, count as isize, -1)
            .await?)
    }
}
