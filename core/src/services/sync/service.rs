//! Main sync worker service implementation

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{AuditEvent, AuditEventKind, SyncItem};
use crate::errors::{DomainError, DomainResult};
use crate::stores::{AuditQueueStore, SyncQueueStore};

use sb_shared::utils::phone;

use super::traits::SyncBackend;

/// What one sync tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Queue was empty
    Idle,
    /// One item was delivered to the backend
    Delivered,
    /// Delivery failed; the item moved to the retry queue
    Requeued,
}

/// Hot-path delivery of verified credentials to the external backend.
///
/// One item per tick keeps the worker's latency coupling to the backend
/// bounded; failures never retry inline, they park in the retry queue
/// until the administrative recovery trigger drains it.
pub struct SyncService<Q, B, A>
where
    Q: SyncQueueStore,
    B: SyncBackend,
    A: AuditQueueStore,
{
    queue: Arc<Q>,
    backend: Arc<B>,
    audit: Arc<A>,
}

impl<Q, B, A> SyncService<Q, B, A>
where
    Q: SyncQueueStore,
    B: SyncBackend,
    A: AuditQueueStore,
{
    pub fn new(queue: Arc<Q>, backend: Arc<B>, audit: Arc<A>) -> Self {
        Self {
            queue,
            backend,
            audit,
        }
    }

    /// Pop and deliver at most one queued item
    pub async fn tick(&self) -> DomainResult<SyncOutcome> {
        let item = match self.queue.pop_sync().await? {
            Some(item) => item,
            None => return Ok(SyncOutcome::Idle),
        };

        match self.backend.deliver(&item).await {
            Ok(()) => {
                tracing::debug!(
                    mobile = %phone::mask_mobile(&item.mobile),
                    event = "sync_delivered",
                    "Delivered sync item to backend"
                );
                self.push_audit(AuditEvent::new(
                    AuditEventKind::SyncDelivered,
                    json!({ "mobile": phone::mobile_last4(&item.mobile) }),
                ))
                .await;
                Ok(SyncOutcome::Delivered)
            }
            Err(e) => {
                tracing::error!(
                    mobile = %phone::mask_mobile(&item.mobile),
                    error = %e,
                    event = "sync_failed",
                    "Backend delivery failed; moving item to retry queue"
                );
                self.queue.push_retry(&item).await?;
                self.push_audit(AuditEvent::new(
                    AuditEventKind::SyncFailed,
                    json!({
                        "mobile": phone::mobile_last4(&item.mobile),
                        "error": e,
                    }),
                ))
                .await;
                Ok(SyncOutcome::Requeued)
            }
        }
    }

    /// Drain the whole retry queue into one signed batch for the recovery
    /// endpoint. On failure every item is requeued in its original order.
    pub async fn drain_retry(&self) -> DomainResult<usize> {
        let mut items: Vec<SyncItem> = Vec::new();
        while let Some(item) = self.queue.pop_retry().await? {
            items.push(item);
        }

        if items.is_empty() {
            return Ok(0);
        }

        if let Err(e) = self.backend.deliver_recovery_batch(&items).await {
            tracing::error!(
                count = items.len(),
                error = %e,
                event = "recovery_batch_failed",
                "Recovery batch delivery failed; requeueing items"
            );
            for item in &items {
                self.queue.push_retry(item).await?;
            }
            return Err(DomainError::DeliveryFailed {
                message: format!("Recovery endpoint error: {}", e),
            });
        }

        tracing::info!(
            count = items.len(),
            event = "recovery_triggered",
            "Recovery batch delivered"
        );
        self.push_audit(AuditEvent::new(
            AuditEventKind::RecoveryTriggered,
            json!({ "users_sent": items.len() }),
        ))
        .await;

        Ok(items.len())
    }

    // Audit buffering is best-effort
    async fn push_audit(&self, event: AuditEvent) {
        if let Err(e) = self.audit.push_event(&event).await {
            tracing::warn!(
                error = %e,
                event = "audit_buffer_failed",
                "Failed to buffer audit event"
            );
        }
    }
}
