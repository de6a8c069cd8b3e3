//! Unit tests for the hot-path sync worker

use std::sync::Arc;

use crate::domain::entities::SyncItem;
use crate::errors::DomainError;
use crate::services::sync::{SyncOutcome, SyncService};
use crate::stores::{MemoryFastStore, SyncQueueStore};

use super::mocks::MockSyncBackend;

fn item(mobile: &str) -> SyncItem {
    SyncItem::new(mobile, "123456", "A3B7K2M9")
}

fn service_with(
    store: Arc<MemoryFastStore>,
    backend: Arc<MockSyncBackend>,
) -> SyncService<MemoryFastStore, MockSyncBackend, MemoryFastStore> {
    SyncService::new(store.clone(), backend, store)
}

#[tokio::test]
async fn test_tick_on_empty_queue_is_idle() {
    let store = Arc::new(MemoryFastStore::new());
    let backend = Arc::new(MockSyncBackend::new(false));
    let service = service_with(store, backend.clone());

    assert_eq!(service.tick().await.unwrap(), SyncOutcome::Idle);
    assert!(backend.delivered_items().is_empty());
}

#[tokio::test]
async fn test_tick_delivers_one_item_fifo() {
    let store = Arc::new(MemoryFastStore::new());
    store.push_sync(&item("+919876543210")).await.unwrap();
    store.push_sync(&item("+919876543211")).await.unwrap();
    let backend = Arc::new(MockSyncBackend::new(false));
    let service = service_with(store.clone(), backend.clone());

    assert_eq!(service.tick().await.unwrap(), SyncOutcome::Delivered);

    // One item per tick, oldest first
    let delivered = backend.delivered_items();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].mobile, "+919876543210");
    assert_eq!(store.sync_queue_len(), 1);

    let events = store.audit_events();
    assert_eq!(events.last().unwrap().event.as_str(), "SYNC_DELIVERED");
}

#[tokio::test]
async fn test_failed_delivery_moves_item_to_retry_queue() {
    let store = Arc::new(MemoryFastStore::new());
    store.push_sync(&item("+919876543210")).await.unwrap();
    let backend = Arc::new(MockSyncBackend::new(true));
    let service = service_with(store.clone(), backend.clone());

    assert_eq!(service.tick().await.unwrap(), SyncOutcome::Requeued);

    // Never dropped, never retried inline
    assert_eq!(store.sync_queue_len(), 0);
    let retries = store.retry_items();
    assert_eq!(retries.len(), 1);
    assert_eq!(retries[0].mobile, "+919876543210");
    assert!(backend.delivered_items().is_empty());

    let events = store.audit_events();
    assert_eq!(events.last().unwrap().event.as_str(), "SYNC_FAILED");
}

#[tokio::test]
async fn test_drain_retry_sends_one_batch() {
    let store = Arc::new(MemoryFastStore::new());
    store.push_retry(&item("+919876543210")).await.unwrap();
    store.push_retry(&item("+919876543211")).await.unwrap();
    let backend = Arc::new(MockSyncBackend::new(false));
    let service = service_with(store.clone(), backend.clone());

    let sent = service.drain_retry().await.unwrap();

    assert_eq!(sent, 2);
    assert_eq!(backend.batch_count(), 1);
    assert!(store.retry_items().is_empty());

    let events = store.audit_events();
    assert_eq!(events.last().unwrap().event.as_str(), "RECOVERY_TRIGGERED");
}

#[tokio::test]
async fn test_drain_retry_empty_queue_sends_nothing() {
    let store = Arc::new(MemoryFastStore::new());
    let backend = Arc::new(MockSyncBackend::new(false));
    let service = service_with(store, backend.clone());

    assert_eq!(service.drain_retry().await.unwrap(), 0);
    assert_eq!(backend.batch_count(), 0);
}

#[tokio::test]
async fn test_drain_retry_failure_requeues_in_order() {
    let store = Arc::new(MemoryFastStore::new());
    store.push_retry(&item("+919876543210")).await.unwrap();
    store.push_retry(&item("+919876543211")).await.unwrap();
    let backend = Arc::new(MockSyncBackend::new(true));
    let service = service_with(store.clone(), backend);

    let result = service.drain_retry().await;
    assert!(matches!(
        result.unwrap_err(),
        DomainError::DeliveryFailed { .. }
    ));

    // Items survive the failed batch in their original order
    let retries = store.retry_items();
    assert_eq!(retries.len(), 2);
    assert_eq!(retries[0].mobile, "+919876543210");
    assert_eq!(retries[1].mobile, "+919876543211");
}
